use clap::{Parser, Subcommand};
use mymatch_domain::{CatalogResource, PermissionId, RoleId, SortOrder};

/// Command-line console for the MyMatch admin backend.
#[derive(Parser, Debug)]
#[command(name = "mymatch-console", version, about = "MyMatch admin console")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the issued credentials.
    Login {
        /// Administrator username.
        #[arg(long)]
        username: String,
        /// Administrator password.
        #[arg(long)]
        password: String,
    },

    /// Invalidate the session and clear stored credentials.
    Logout,

    /// Show whether credentials are stored.
    Status,

    /// Inspect or edit role/permission assignments.
    Matrix {
        #[command(subcommand)]
        action: MatrixAction,
    },

    /// Manage permissions.
    Permission {
        #[command(subcommand)]
        action: PermissionAction,
    },

    /// Manage roles.
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// List one page of records.
    List {
        /// Resource type (e.g. universities, courses, users).
        resource: CatalogResource,
        /// One-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size.
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// Sort field.
        #[arg(long, default_value = "id")]
        sort_by: String,
        /// Sort direction (asc or desc).
        #[arg(long, default_value = "desc")]
        sort_order: SortOrder,
        /// Extra filter as key=value; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },

    /// Fetch one record.
    Get {
        /// Resource type.
        resource: CatalogResource,
        /// Record id.
        id: String,
    },

    /// Create a record from a JSON object.
    Create {
        /// Resource type.
        resource: CatalogResource,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
    },

    /// Replace a record with a JSON object.
    Update {
        /// Resource type.
        resource: CatalogResource,
        /// Record id.
        id: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: String,
    },

    /// Delete a record.
    Delete {
        /// Resource type.
        resource: CatalogResource,
        /// Record id.
        id: String,
    },

    /// Moderate student reviews.
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Moderate platform users.
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum MatrixAction {
    /// Print the loaded matrix.
    Show,
    /// Grant a permission to a role and save the role.
    Grant {
        role: RoleId,
        permission: PermissionId,
    },
    /// Revoke a permission from a role and save the role.
    Revoke {
        role: RoleId,
        permission: PermissionId,
    },
}

#[derive(Subcommand, Debug)]
pub enum PermissionAction {
    /// Create a permission.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename or re-describe a permission.
    Update {
        id: PermissionId,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a permission.
    Delete { id: PermissionId },
}

#[derive(Subcommand, Debug)]
pub enum RoleAction {
    /// Create a role with optional initial grants.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Granted permission id; repeatable.
        #[arg(long = "permission")]
        permissions: Vec<PermissionId>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReviewAction {
    /// Mark a review as verified.
    Verify { id: String },
    /// Revert a review to unverified.
    Unverify { id: String },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Ban a user.
    Ban { id: String },
    /// Lift a ban.
    Unban { id: String },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("filter '{raw}' must be key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter '{raw}' has an empty key"));
    }

    Ok((key.to_owned(), value.to_owned()))
}
