//! API operations concerning folders and the ownership of folders and
//! dashboards.

use std::{fmt::Display, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::{
    Client, Error, Transport,
    api::{ApiRequest, JsonResponse, Method, Query},
};

/// A folder in the navigation tree, with its subfolders and dashboards.
#[derive(Debug, Clone, Deserialize)]
pub struct Folder {
    /// The folder id.
    pub oid: String,
    /// The folder name.
    #[serde(default)]
    pub name: String,
    /// Subfolders.
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// Dashboards directly in this folder.
    #[serde(default)]
    pub dashboards: Vec<FolderDashboard>,
}

/// A dashboard as listed in the navigation tree.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderDashboard {
    /// The dashboard id.
    pub oid: String,
    /// The dashboard title.
    #[serde(default)]
    pub title: String,
}

impl Folder {
    /// Whether this folder, or any folder below it, has the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.folders.iter().any(|f| f.contains(name))
    }

    /// This folder and every folder below it, depth first.
    pub fn walk(&self) -> Vec<&Folder> {
        let mut out = vec![self];
        for folder in &self.folders {
            out.extend(folder.walk());
        }
        out
    }
}

/// The navigation tree visible to the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Navigation {
    /// The top-level folders.
    #[serde(default)]
    pub folders: Vec<Folder>,
}

impl JsonResponse for Navigation {}

impl Navigation {
    /// The top-level folder whose tree holds a folder with the given name.
    pub fn root_containing(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.contains(name))
    }
}

/// Fetch the navigation tree.
#[derive(Debug, Clone, Copy)]
pub struct GetNavigation;

impl ApiRequest for GetNavigation {
    type Response = Navigation;

    fn path(&self) -> String {
        "/api/v1/navver".to_string()
    }
}

/// Give a folder a new owner.
#[derive(Debug, Clone)]
pub struct ChangeFolderOwner<'a> {
    /// The folder id.
    pub id: &'a str,
    /// The user id of the new owner.
    pub owner: &'a str,
}

impl ApiRequest for ChangeFolderOwner<'_> {
    type Response = Value;

    fn method(&self) -> Method {
        Method::Patch
    }

    fn path(&self) -> String {
        format!("/api/v1/folders/{}", self.id)
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(json!({ "owner": self.owner }))
    }
}

/// The owner of a dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardOwner {
    /// The user id of the owner.
    #[serde(default)]
    pub owner: Option<String>,
}

impl JsonResponse for DashboardOwner {}

/// Fetch a dashboard's owner.
#[derive(Debug, Clone)]
pub struct GetDashboardOwner<'a> {
    /// The dashboard id.
    pub id: &'a str,
}

impl ApiRequest for GetDashboardOwner<'_> {
    type Response = DashboardOwner;

    fn path(&self) -> String {
        format!("/api/v1/dashboards/{}", self.id)
    }
}

/// The access the previous owner keeps on a dashboard after handing it over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerRule {
    /// Keep edit access.
    #[default]
    Edit,
    /// Keep view access.
    View,
}

impl OwnerRule {
    /// The name used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerRule::Edit => "edit",
            OwnerRule::View => "view",
        }
    }
}

impl Display for OwnerRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edit" => Ok(OwnerRule::Edit),
            "view" => Ok(OwnerRule::View),
            _ => Err(Error::InvalidArgument(format!("unknown owner rule: {s}"))),
        }
    }
}

/// Give a dashboard a new owner.
#[derive(Debug, Clone)]
pub struct ChangeDashboardOwner<'a> {
    /// The dashboard id.
    pub id: &'a str,
    /// The user id of the new owner.
    pub owner: &'a str,
    /// The access the previous owner keeps.
    pub original_owner_rule: OwnerRule,
    /// Act as an administrator, for dashboards the caller does not own.
    pub admin_access: bool,
}

impl ApiRequest for ChangeDashboardOwner<'_> {
    type Response = Value;

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> String {
        format!("/api/v1/dashboards/{}/change_owner", self.id)
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        if self.admin_access {
            query.insert("adminAccess".into(), "true".into());
        }
        query
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(json!({
            "ownerId": self.owner,
            "originalOwnerRule": self.original_owner_rule,
        }))
    }
}

/// A request to hand a folder tree, and optionally its dashboards, to a new
/// owner. See [Client::transfer_ownership].
#[derive(Debug, Clone)]
pub struct OwnershipTransfer<'a> {
    /// The name of the target folder.
    pub folder: &'a str,
    /// The email address of the new owner.
    pub new_owner: &'a str,
    /// The email address of the user making the change.
    pub current_user: &'a str,
    /// The access previous dashboard owners keep.
    pub original_owner_rule: OwnerRule,
    /// Also hand over the dashboards in the folder tree.
    pub include_dashboards: bool,
}

/// The outcome of an ownership transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipChange {
    /// The number of folders whose owner was changed.
    pub folders_changed: usize,
    /// The number of dashboards whose owner was changed.
    pub dashboards_changed: usize,
}

impl<T: Transport> Client<T> {
    /// Hand every folder in the tree around the target folder to a new
    /// owner, and optionally every dashboard in those folders.
    ///
    /// The tree is the top-level folder holding the target folder, with all
    /// of its subfolders. Dashboards already owned by the new owner are left
    /// alone. Dashboards the current user doesn't own are changed with admin
    /// access. Failures on single folders or dashboards are logged and
    /// skipped; only folders and dashboards actually changed are counted.
    pub fn transfer_ownership(
        &self,
        transfer: &OwnershipTransfer<'_>,
    ) -> Result<OwnershipChange, Error> {
        self.logged(|| {
            let OwnershipTransfer {
                folder,
                new_owner,
                current_user,
                original_owner_rule,
                include_dashboards,
            } = *transfer;

            info!("Looking for folder '{folder}' to change ownership to '{new_owner}'");
            let navigation = self.roundtrip(GetNavigation)?;
            let Some(root) = navigation.root_containing(folder) else {
                let err = Error::NotFound(format!("Folder '{folder}'"));
                error!("{err}");
                return Err(err);
            };

            let mut folders = IndexMap::new();
            let mut dashboards = IndexMap::new();
            for f in root.walk() {
                folders.entry(f.oid.as_str()).or_insert(f.name.as_str());
                for d in &f.dashboards {
                    dashboards.entry(d.oid.as_str()).or_insert(d.title.as_str());
                }
            }

            info!(
                "Found {} folders and {} dashboards under '{}'",
                folders.len(),
                dashboards.len(),
                root.name
            );

            let new_owner_id = self.get_user(new_owner)?.user_id;
            let mut change = OwnershipChange::default();

            for (id, name) in folders {
                debug!("Changing owner for folder {name} (ID: {id})");
                let req = ChangeFolderOwner {
                    id,
                    owner: &new_owner_id,
                };

                match self.roundtrip(req) {
                    Ok(resp) if resp["owner"].as_str() == Some(new_owner_id.as_str()) => {
                        info!("Folder '{name}' owner changed to {new_owner}");
                        change.folders_changed += 1;
                    }
                    Ok(_) => error!("Failed to change folder owner for '{name}'"),
                    Err(e @ Error::Transport { .. }) => return Err(e),
                    Err(e) => error!("Failed to change folder owner for '{name}': {e}"),
                }
            }

            if include_dashboards && !dashboards.is_empty() {
                let current_user_id = self.get_user(current_user)?.user_id;

                for (id, title) in dashboards {
                    let owner = match self.roundtrip(GetDashboardOwner { id }) {
                        Ok(dashboard) => dashboard.owner,
                        Err(e @ Error::Transport { .. }) => return Err(e),
                        Err(e) => {
                            error!("Dashboard with ID '{id}' not found. Skipping: {e}");
                            continue;
                        }
                    };

                    if owner.as_deref() == Some(new_owner_id.as_str()) {
                        info!("Dashboard '{title}' is already owned by {new_owner}");
                        continue;
                    }

                    let req = ChangeDashboardOwner {
                        id,
                        owner: &new_owner_id,
                        original_owner_rule,
                        admin_access: owner.as_deref() != Some(current_user_id.as_str()),
                    };

                    match self.roundtrip(req) {
                        Ok(_) => {
                            info!("Dashboard '{title}' owner changed to {new_owner}");
                            change.dashboards_changed += 1;
                        }
                        Err(e @ Error::Transport { .. }) => return Err(e),
                        Err(e) => error!("Failed to change dashboard owner for '{title}': {e}"),
                    }
                }
            }

            info!(
                "Ownership changed for {} folders and {} dashboards",
                change.folders_changed, change.dashboards_changed
            );
            Ok(change)
        })
    }
}
