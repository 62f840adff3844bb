//! API operations concerning users, roles and groups.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    Client, Error, Transport,
    api::{ApiRequest, JsonResponse, Method, Query},
};

/// Groups every user belongs to implicitly. They are left out of
/// [Client::users_per_group_all].
const IMPLICIT_GROUPS: [&str; 2] = ["Everyone", "All users in system"];

/// The group that also collects users with an administrative role.
const ADMINS_GROUP: &str = "Admins";

const ADMIN_ROLES: [&str; 3] = ["sysAdmin", "dataAdmin", "admin"];

/// A user, with its role and groups expanded.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user id.
    #[serde(rename = "_id")]
    pub id: String,
    /// The user name.
    #[serde(default)]
    pub user_name: String,
    /// The first name.
    #[serde(default)]
    pub first_name: String,
    /// The last name, empty if unset.
    #[serde(default)]
    pub last_name: String,
    /// The email address.
    #[serde(default)]
    pub email: String,
    /// Whether the account is active.
    #[serde(default)]
    pub active: bool,
    /// The user's role.
    #[serde(default)]
    pub role: Option<Role>,
    /// The groups the user belongs to.
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl JsonResponse for User {}

/// A role, e.g. `consumer` or `dataAdmin`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Role {
    /// The role id.
    #[serde(rename = "_id")]
    pub id: String,
    /// The internal role name.
    pub name: String,
}

impl JsonResponse for Role {}

/// A user group.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    /// The group id.
    #[serde(rename = "_id")]
    pub id: String,
    /// The group name.
    pub name: String,
}

impl JsonResponse for Group {}

/// A flattened view of a [User], with role names as shown in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UserSummary {
    /// The user id.
    pub user_id: String,
    /// The user name.
    pub user_name: String,
    /// The first name.
    pub first_name: String,
    /// The last name, empty if unset.
    pub last_name: String,
    /// The email address.
    pub email: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// The role id, empty if the user has no role.
    pub role_id: String,
    /// The role name, e.g. `viewer` or `dataAdmin`.
    pub role_name: String,
    /// Group names. `Everyone` is only listed when it is the user's only
    /// group.
    pub groups: Vec<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        let mut groups: Vec<String> = user.groups.iter().map(|g| g.name.clone()).collect();
        if groups.len() > 1 {
            groups.retain(|g| g != "Everyone");
        }

        let (role_id, role_name) = match &user.role {
            Some(role) => (role.id.clone(), display_role(&role.name).to_owned()),
            None => Default::default(),
        };

        Self {
            user_id: user.id.clone(),
            user_name: user.user_name.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_active: user.active,
            role_id,
            role_name,
            groups,
        }
    }
}

/// The name a role is shown with, given its internal name.
pub fn display_role(name: &str) -> &str {
    match name {
        "consumer" => "viewer",
        "super" => "sysAdmin",
        "contributor" => "dashboardDesigner",
        other => other,
    }
}

/// The internal name of a role, upper-cased, given the name a caller used.
/// Matching is case-insensitive, and `viewer` and `designer` are accepted as
/// aliases.
fn internal_role(name: &str) -> String {
    let name = name.to_uppercase();
    match name.as_str() {
        "VIEWER" => "CONSUMER".to_owned(),
        "DESIGNER" => "CONTRIBUTOR".to_owned(),
        _ => name,
    }
}

/// The users belonging to one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMembers {
    /// The group name.
    pub group: String,
    /// The user names of the members.
    #[serde(rename = "username")]
    pub usernames: Vec<String>,
}

/// A user to create. The role and groups are given by name.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// The email address.
    pub email: String,
    /// The user name.
    pub user_name: Option<String>,
    /// The first name.
    pub first_name: String,
    /// The last name.
    pub last_name: Option<String>,
    /// The role name, e.g. `viewer`, `designer` or `dataAdmin`.
    pub role: String,
    /// Group names.
    pub groups: Vec<String>,
    /// User preferences, passed through as-is.
    pub preferences: Option<Value>,
}

/// Changes to an existing user. Fields left as `None` are not sent.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// The email address.
    pub email: Option<String>,
    /// The user name.
    pub user_name: Option<String>,
    /// The first name.
    pub first_name: Option<String>,
    /// The last name.
    pub last_name: Option<String>,
    /// The new role name.
    pub role: Option<String>,
    /// The new set of groups, by name. An empty list removes the user from
    /// every group.
    pub groups: Option<Vec<String>>,
    /// User preferences.
    pub preferences: Option<Value>,
}

/// The payload for creating or updating a user, with role and groups
/// resolved to ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// The email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// The first name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// The last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// The role id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    /// Group ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    /// User preferences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
}

/// List all users, with groups and role expanded.
#[derive(Debug, Clone, Copy)]
pub struct GetUsers;

impl ApiRequest for GetUsers {
    type Response = Vec<User>;

    fn path(&self) -> String {
        "/api/v1/users".to_string()
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        query.insert("expand".into(), "groups,role".into());
        query
    }
}

/// List all roles.
#[derive(Debug, Clone, Copy)]
pub struct GetRoles;

impl ApiRequest for GetRoles {
    type Response = Vec<Role>;

    fn path(&self) -> String {
        "/api/roles".to_string()
    }
}

/// List all groups.
#[derive(Debug, Clone, Copy)]
pub struct GetGroups;

impl ApiRequest for GetGroups {
    type Response = Vec<Group>;

    fn path(&self) -> String {
        "/api/v1/groups".to_string()
    }
}

/// Create a user.
#[derive(Debug, Clone)]
pub struct CreateUser<'a> {
    /// The user to create.
    pub user: &'a UserPayload,
}

impl ApiRequest for CreateUser<'_> {
    type Response = Value;

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> String {
        "/api/v1/users".to_string()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.user)
    }
}

/// Update a user by id.
#[derive(Debug, Clone)]
pub struct UpdateUser<'a> {
    /// The user id.
    pub id: &'a str,
    /// The fields to change.
    pub changes: &'a UserPayload,
}

impl ApiRequest for UpdateUser<'_> {
    type Response = Value;

    fn method(&self) -> Method {
        Method::Patch
    }

    fn path(&self) -> String {
        format!("/api/v1/users/{}", self.id)
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.changes)
    }
}

/// Delete a user by id.
#[derive(Debug, Clone)]
pub struct DeleteUser<'a> {
    /// The user id.
    pub id: &'a str,
}

impl ApiRequest for DeleteUser<'_> {
    type Response = Value;

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> String {
        format!("/api/v1/users/{}", self.id)
    }
}

impl<T: Transport> Client<T> {
    /// Fetch every user as a [UserSummary].
    pub fn get_users_all(&self) -> Result<Vec<UserSummary>, Error> {
        self.logged(|| {
            debug!("Getting all users");
            let users = self.roundtrip(GetUsers)?;
            let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();

            info!("Found {} users", summaries.len());
            Ok(summaries)
        })
    }

    /// Fetch a single user by email address.
    pub fn get_user(&self, email: &str) -> Result<UserSummary, Error> {
        self.logged(|| {
            debug!("Getting user with email: {email}");
            let found = self
                .get_users_all()?
                .into_iter()
                .find(|user| user.email == email);

            match found {
                Some(user) => {
                    info!("Found user: {}", user.email);
                    Ok(user)
                }
                None => Err(not_found(format!("User '{email}'"))),
            }
        })
    }

    /// Create a user, resolving the role and group names to ids first.
    /// Returns the created user as sent back by the server.
    pub fn create_user(&self, user: &NewUser) -> Result<Value, Error> {
        self.logged(|| {
            debug!("Creating user: {}", user.email);
            let payload = UserPayload {
                email: Some(user.email.clone()),
                user_name: user.user_name.clone(),
                first_name: Some(user.first_name.clone()),
                last_name: user.last_name.clone(),
                role_id: Some(self.resolve_role(&user.role)?),
                groups: Some(self.resolve_groups(&user.groups)?),
                preferences: user.preferences.clone(),
            };

            debug!("Final user data for API call: {payload:?}");
            let created = self.roundtrip(CreateUser { user: &payload })?;
            info!("User created successfully: {}", user.email);
            Ok(created)
        })
    }

    /// Update the user with the given email address.
    pub fn update_user(&self, email: &str, update: &UserUpdate) -> Result<Value, Error> {
        self.logged(|| {
            debug!("Updating user with email: {email}");
            let user = self.get_user(email)?;

            let role_id = match &update.role {
                Some(role) => Some(self.resolve_role(role)?),
                None => None,
            };
            let groups = match &update.groups {
                Some(groups) => Some(self.resolve_groups(groups)?),
                None => None,
            };

            let payload = UserPayload {
                email: update.email.clone(),
                user_name: update.user_name.clone(),
                first_name: update.first_name.clone(),
                last_name: update.last_name.clone(),
                role_id,
                groups,
                preferences: update.preferences.clone(),
            };

            debug!("Final updated user data for API call: {payload:?}");
            let updated = self.roundtrip(UpdateUser {
                id: &user.user_id,
                changes: &payload,
            })?;

            info!("User updated successfully: {email}");
            Ok(updated)
        })
    }

    /// Delete the user with the given email address.
    pub fn delete_user(&self, email: &str) -> Result<Value, Error> {
        self.logged(|| {
            let user = self.get_user(email)?;
            let deleted = self.roundtrip(DeleteUser { id: &user.user_id })?;

            info!("User '{email}' (ID: {}) deleted successfully", user.user_id);
            Ok(deleted)
        })
    }

    /// The user names of every member of a group. The group name is matched
    /// case-insensitively.
    pub fn users_per_group(&self, group: &str) -> Result<GroupMembers, Error> {
        self.logged(|| {
            let wanted = group.to_uppercase();
            let usernames: Vec<String> = self
                .get_users_all()?
                .into_iter()
                .filter(|user| user.groups.iter().any(|g| g.to_uppercase() == wanted))
                .map(|user| user.user_name)
                .collect();

            info!("Found {} users in the group '{group}'", usernames.len());
            Ok(GroupMembers {
                group: group.to_owned(),
                usernames,
            })
        })
    }

    /// Every group with its members, including empty groups.
    ///
    /// `Everyone` and `All users in system` are left out. An `Admins` entry
    /// is always present, and also lists users whose role is `sysAdmin`,
    /// `dataAdmin` or `admin`.
    pub fn users_per_group_all(&self) -> Result<Vec<GroupMembers>, Error> {
        self.logged(|| {
            let groups = self.roundtrip(GetGroups)?;
            let users = self.get_users_all()?;

            let mut members: IndexMap<String, Vec<String>> = groups
                .into_iter()
                .filter(|g| !IMPLICIT_GROUPS.contains(&g.name.as_str()))
                .map(|g| (g.name, Vec::new()))
                .collect();
            members.entry(ADMINS_GROUP.to_owned()).or_default();

            for user in &users {
                for group in &user.groups {
                    if IMPLICIT_GROUPS.contains(&group.as_str()) {
                        continue;
                    }

                    debug!("Added user {} to group {group}", user.user_name);
                    members
                        .entry(group.clone())
                        .or_default()
                        .push(user.user_name.clone());
                }
            }

            let admins = members.entry(ADMINS_GROUP.to_owned()).or_default();
            for user in &users {
                if ADMIN_ROLES.contains(&user.role_name.as_str())
                    && !admins.contains(&user.user_name)
                {
                    admins.push(user.user_name.clone());
                }
            }

            info!("Found {} groups", members.len());
            Ok(members
                .into_iter()
                .map(|(group, usernames)| GroupMembers { group, usernames })
                .collect())
        })
    }

    fn resolve_role(&self, name: &str) -> Result<String, Error> {
        let wanted = internal_role(name);
        let roles = self.roundtrip(GetRoles)?;

        roles
            .into_iter()
            .find(|role| role.name.to_uppercase() == wanted)
            .map(|role| role.id)
            .ok_or_else(|| not_found(format!("Role '{name}'")))
    }

    fn resolve_groups(&self, names: &[String]) -> Result<Vec<String>, Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let groups = self.roundtrip(GetGroups)?;
        names
            .iter()
            .map(|name| {
                let wanted = name.to_uppercase();
                groups
                    .iter()
                    .find(|g| g.name.to_uppercase() == wanted)
                    .map(|g| g.id.clone())
                    .ok_or_else(|| not_found(format!("Group '{name}'")))
            })
            .collect()
    }
}

fn not_found(what: String) -> Error {
    let err = Error::NotFound(what);
    tracing::error!("{err}");
    err
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::testutil::{MockTransport, Recorded, read_log, reply, test_client};

    const USERS: &str = r#"[
        {"_id": "u1", "userName": "ann", "firstName": "Ann", "lastName": "Lee",
         "email": "ann@example.com", "active": true,
         "role": {"_id": "r1", "name": "consumer"},
         "groups": [{"_id": "g0", "name": "Everyone"}, {"_id": "g1", "name": "Sales"}]},
        {"_id": "u2", "userName": "bob", "firstName": "Bob",
         "email": "bob@example.com", "active": false,
         "role": {"_id": "r2", "name": "super"},
         "groups": [{"_id": "g0", "name": "Everyone"}]},
        {"_id": "u3", "userName": "cat", "firstName": "Cat",
         "email": "cat@example.com", "active": true,
         "role": {"_id": "r3", "name": "dataAdmin"},
         "groups": [{"_id": "g2", "name": "Admins"}]}
    ]"#;

    const GROUPS: &str = r#"[
        {"_id": "g0", "name": "Everyone"},
        {"_id": "g1", "name": "Sales"},
        {"_id": "g2", "name": "Admins"},
        {"_id": "g3", "name": "Marketing"},
        {"_id": "g4", "name": "All users in system"}
    ]"#;

    const ROLES: &str = r#"[
        {"_id": "r1", "name": "consumer"},
        {"_id": "r2", "name": "super"},
        {"_id": "r5", "name": "contributor"}
    ]"#;

    fn directory() -> MockTransport {
        MockTransport::new(|call: &Recorded| {
            match (call.method.as_str(), call.path()) {
                ("GET", "/api/v1/users") => reply(200, USERS),
                ("GET", "/api/v1/groups") => reply(200, GROUPS),
                ("GET", "/api/roles") => reply(200, ROLES),
                ("POST", "/api/v1/users") => reply(201, r#"{"_id": "u9"}"#),
                ("PATCH", path) | ("DELETE", path) if path.starts_with("/api/v1/users/") => {
                    reply(200, r#"{"ok": true}"#)
                }
                _ => reply(404, "not found"),
            }
        })
    }

    #[test]
    fn users_all_are_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let users = client.get_users_all().unwrap();
        assert_eq!(users.len(), 3);

        assert_eq!(
            users[0],
            UserSummary {
                user_id: "u1".into(),
                user_name: "ann".into(),
                first_name: "Ann".into(),
                last_name: "Lee".into(),
                email: "ann@example.com".into(),
                is_active: true,
                role_id: "r1".into(),
                role_name: "viewer".into(),
                groups: vec!["Sales".into()],
            }
        );

        assert_eq!(users[1].role_name, "sysAdmin");
        assert_eq!(users[1].last_name, "");
        assert_eq!(users[1].groups, ["Everyone"]);

        let call = &client.transport().calls()[0];
        assert_eq!(call.uri.query(), Some("expand=groups%2Crole"));
    }

    #[test]
    fn summary_serializes_with_upper_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let users = client.get_users_all().unwrap();
        let value = serde_json::to_value(&users[0]).unwrap();
        assert_eq!(value["USER_NAME"], "ann");
        assert_eq!(value["ROLE_NAME"], "viewer");
        assert_eq!(value["GROUPS"], json!(["Sales"]));
    }

    #[test]
    fn get_user_by_email() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let user = client.get_user("bob@example.com").unwrap();
        assert_eq!(user.user_id, "u2");

        assert_matches!(
            client.get_user("nobody@example.com"),
            Err(Error::NotFound(what)) if what.contains("nobody@example.com")
        );
        assert!(read_log(dir.path()).contains("User 'nobody@example.com' not found"));
    }

    #[test]
    fn get_users_fails_on_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), MockTransport::fixed(401, r#"{"error": "bad"}"#));

        assert_matches!(
            client.get_users_all(),
            Err(Error::Api { status, .. }) if status == 401
        );
    }

    #[test]
    fn create_user_resolves_names() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let user = NewUser {
            email: "dan@example.com".into(),
            first_name: "Dan".into(),
            role: "Viewer".into(),
            groups: vec!["sales".into(), "MARKETING".into()],
            ..Default::default()
        };

        let created = client.create_user(&user).unwrap();
        assert_eq!(created, json!({"_id": "u9"}));

        let calls = client.transport().calls();
        let post = calls.iter().find(|c| c.method == "POST").unwrap();
        assert_eq!(
            post.json(),
            json!({
                "email": "dan@example.com",
                "firstName": "Dan",
                "roleId": "r1",
                "groups": ["g1", "g3"]
            })
        );
    }

    #[test]
    fn create_user_without_groups_skips_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let user = NewUser {
            email: "eve@example.com".into(),
            first_name: "Eve".into(),
            role: "designer".into(),
            ..Default::default()
        };
        client.create_user(&user).unwrap();

        let calls = client.transport().calls();
        assert!(calls.iter().all(|c| c.path() != "/api/v1/groups"));

        let post = calls.iter().find(|c| c.method == "POST").unwrap();
        assert_eq!(post.json()["roleId"], "r5");
        assert_eq!(post.json()["groups"], json!([]));
    }

    #[test]
    fn create_user_with_unknown_role_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let user = NewUser {
            email: "dan@example.com".into(),
            role: "wizard".into(),
            ..Default::default()
        };

        assert_matches!(
            client.create_user(&user),
            Err(Error::NotFound(what)) if what == "Role 'wizard'"
        );
        assert!(client.transport().calls().iter().all(|c| c.method != "POST"));
    }

    #[test]
    fn create_user_with_unknown_group_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let user = NewUser {
            email: "dan@example.com".into(),
            role: "viewer".into(),
            groups: vec!["Finance".into()],
            ..Default::default()
        };

        assert_matches!(client.create_user(&user), Err(Error::NotFound(_)));
        assert!(client.transport().calls().iter().all(|c| c.method != "POST"));
    }

    #[test]
    fn update_user_sends_only_changes() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let update = UserUpdate {
            role: Some("designer".into()),
            last_name: Some("Lee-Smith".into()),
            ..Default::default()
        };
        client.update_user("ann@example.com", &update).unwrap();

        let calls = client.transport().calls();
        let patch = calls.iter().find(|c| c.method == "PATCH").unwrap();
        assert_eq!(patch.path(), "/api/v1/users/u1");
        assert_eq!(
            patch.json(),
            json!({"lastName": "Lee-Smith", "roleId": "r5"})
        );
    }

    #[test]
    fn update_user_can_clear_groups() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let update = UserUpdate {
            groups: Some(Vec::new()),
            ..Default::default()
        };
        client.update_user("ann@example.com", &update).unwrap();

        let calls = client.transport().calls();
        let patch = calls.iter().find(|c| c.method == "PATCH").unwrap();
        assert_eq!(patch.json(), json!({"groups": []}));
    }

    #[test]
    fn delete_user_by_email() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        client.delete_user("cat@example.com").unwrap();
        let calls = client.transport().calls();
        let delete = calls.iter().find(|c| c.method == "DELETE").unwrap();
        assert_eq!(delete.path(), "/api/v1/users/u3");

        assert_matches!(
            client.delete_user("nobody@example.com"),
            Err(Error::NotFound(_))
        );
        let deletes = client
            .transport()
            .calls()
            .iter()
            .filter(|c| c.method == "DELETE")
            .count();
        assert_eq!(deletes, 1);
    }

    #[test]
    fn members_of_one_group() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let members = client.users_per_group("sales").unwrap();
        assert_eq!(members.group, "sales");
        assert_eq!(members.usernames, ["ann"]);

        let members = client.users_per_group("Nobody").unwrap();
        assert!(members.usernames.is_empty());
    }

    #[test]
    fn members_of_every_group() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(dir.path(), directory());

        let all = client.users_per_group_all().unwrap();
        assert_eq!(
            all,
            [
                GroupMembers {
                    group: "Sales".into(),
                    usernames: vec!["ann".into()],
                },
                GroupMembers {
                    group: "Admins".into(),
                    usernames: vec!["cat".into(), "bob".into()],
                },
                GroupMembers {
                    group: "Marketing".into(),
                    usernames: vec![],
                },
            ]
        );
    }

    #[test]
    fn admins_group_is_always_present() {
        let dir = tempfile::tempdir().unwrap();
        let client = test_client(
            dir.path(),
            MockTransport::new(|call| match call.path() {
                "/api/v1/groups" => reply(200, r#"[{"_id": "g1", "name": "Sales"}]"#),
                _ => reply(200, "[]"),
            }),
        );

        let all = client.users_per_group_all().unwrap();
        let names: Vec<_> = all.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, ["Sales", "Admins"]);
    }

    #[test]
    fn role_names() {
        assert_eq!(display_role("consumer"), "viewer");
        assert_eq!(display_role("contributor"), "dashboardDesigner");
        assert_eq!(display_role("dataAdmin"), "dataAdmin");
        assert_eq!(internal_role("viewer"), "CONSUMER");
        assert_eq!(internal_role("Designer"), "CONTRIBUTOR");
        assert_eq!(internal_role("dataAdmin"), "DATAADMIN");
    }
}
