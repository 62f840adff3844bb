//! API operations concerning dashboards, their shares and the data model
//! columns they use.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::{
    Client, Error, Transport,
    api::{ApiRequest, JsonResponse, Method, Query},
    user::{GetGroups, GetUsers},
};

/// The number of dashboards requested per search page.
pub const PAGE_SIZE: usize = 50;

const UNKNOWN_TABLE: &str = "Unknown Table";
const UNKNOWN_COLUMN: &str = "Unknown Column";
const UNKNOWN_WIDGET: &str = "Unknown Widget";

/// A dashboard, as returned by a search.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// The dashboard id.
    pub oid: String,
    /// The dashboard title.
    #[serde(default)]
    pub title: String,
    /// The id of the folder containing the dashboard.
    #[serde(default)]
    pub parent_folder: Option<String>,
    /// Users and groups the dashboard is shared with.
    #[serde(default)]
    pub shares: Vec<Share>,
}

/// A single share of a dashboard.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    /// The id of the user or group.
    pub share_id: String,
    /// `user` or `group`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The access rule, e.g. `view` or `edit`.
    #[serde(default)]
    pub rule: Option<String>,
}

/// A page of search results.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashboardPage {
    /// The dashboards on this page. Empty once the results are exhausted.
    #[serde(default)]
    pub items: Vec<Dashboard>,
}

impl JsonResponse for DashboardPage {}
impl JsonResponse for Dashboard {}

/// Search every dashboard on the deployment, sorted by title.
#[derive(Debug, Clone)]
pub struct SearchDashboards<'a> {
    /// Only return dashboards matching this text. Empty matches everything.
    pub search: &'a str,
    /// The number of results to skip.
    pub skip: usize,
    /// The maximum number of results to return.
    pub limit: usize,
}

impl ApiRequest for SearchDashboards<'_> {
    type Response = DashboardPage;

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> String {
        "/api/v1/dashboards/searches".to_string()
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(json!({
            "queryParams": {
                "ownershipType": "allRoot",
                "search": self.search,
                "ownerInfo": true,
                "asObject": true
            },
            "queryOptions": {
                "sort": {"title": 1},
                "limit": self.limit,
                "skip": self.skip
            }
        }))
    }
}

/// List the dashboards built on a data model. Requires admin access.
#[derive(Debug, Clone)]
pub struct GetDataModelDashboards<'a> {
    /// The data model title.
    pub datamodel: &'a str,
}

impl ApiRequest for GetDataModelDashboards<'_> {
    type Response = Vec<Dashboard>;

    fn path(&self) -> String {
        "/api/v1/dashboards/admin".to_string()
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        query.insert("datasourceTitle".into(), self.datamodel.into());
        query
    }
}

/// Export a dashboard with its filters and widgets.
#[derive(Debug, Clone)]
pub struct ExportDashboard<'a> {
    /// The dashboard id.
    pub id: &'a str,
}

impl ApiRequest for ExportDashboard<'_> {
    type Response = Vec<ExportedDashboard>;

    fn path(&self) -> String {
        "/api/v1/dashboards/export".to_string()
    }

    fn query(&self) -> Query {
        let mut query = Query::new();
        query.insert("dashboardIds".into(), self.id.into());
        query.insert("adminAccess".into(), "true".into());
        query
    }
}

/// An exported dashboard. Only the parts that reference data model columns
/// are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportedDashboard {
    /// The dashboard title.
    #[serde(default)]
    pub title: String,
    /// Dashboard-level filters.
    #[serde(default)]
    pub filters: Vec<DashboardFilter>,
    /// The widgets on the dashboard.
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl JsonResponse for ExportedDashboard {}

/// A dashboard filter. Dependent filters list one field per level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFilter {
    /// The levels of a dependent filter.
    #[serde(default)]
    pub levels: Option<Vec<Jaql>>,
    /// The field of a simple filter.
    #[serde(default)]
    pub jaql: Option<Jaql>,
}

/// A widget, with the panels (rows, values, columns, filters) that hold its
/// fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Widget {
    /// The widget id.
    #[serde(default)]
    pub oid: Option<String>,
    /// The widget definition.
    #[serde(default)]
    pub metadata: WidgetMetadata,
}

/// The definition of a [Widget].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetMetadata {
    /// The widget's panels.
    #[serde(default)]
    pub panels: Vec<Panel>,
}

/// One panel of a widget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Panel {
    /// The fields placed on the panel.
    #[serde(default)]
    pub items: Vec<PanelItem>,
}

/// A field placed on a widget panel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelItem {
    /// The field.
    #[serde(default)]
    pub jaql: Jaql,
}

/// A field reference. Formulas and measured filters reference their
/// fields through `context` instead of `table` and `column`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Jaql {
    /// The table name.
    #[serde(default)]
    pub table: Option<String>,
    /// The column name.
    #[serde(default)]
    pub column: Option<String>,
    /// The fields of a formula, by placeholder.
    #[serde(default)]
    pub context: Option<IndexMap<String, Jaql>>,
}

/// Where a dashboard uses a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSource {
    /// A dashboard filter.
    Filter,
    /// A widget panel.
    Widget,
}

/// A column used by a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardColumn {
    /// The dashboard title.
    pub dashboard_name: String,
    /// Whether a filter or a widget uses the column.
    pub source: ColumnSource,
    /// The widget using the column. `None` for dashboard filters.
    pub widget_id: Option<String>,
    /// The table name, `Unknown Table` if the field has none.
    pub table: String,
    /// The column name, `Unknown Column` if the field has none.
    pub column: String,
}

impl ExportedDashboard {
    /// Every column referenced by the dashboard's filters and widget panels,
    /// filters first. A column is listed once per use.
    pub fn columns(&self) -> Vec<DashboardColumn> {
        let mut columns = Vec::new();
        for filter in &self.filters {
            match (&filter.levels, &filter.jaql) {
                (Some(levels), _) => columns.extend(
                    levels
                        .iter()
                        .map(|jaql| self.column(ColumnSource::Filter, None, jaql)),
                ),
                (None, Some(jaql)) => columns.push(self.column(ColumnSource::Filter, None, jaql)),
                (None, None) => (),
            }
        }

        let source = ColumnSource::Widget;
        for widget in &self.widgets {
            let widget_id = Some(widget.oid.as_deref().unwrap_or(UNKNOWN_WIDGET));
            for item in widget.metadata.panels.iter().flat_map(|p| &p.items) {
                match &item.jaql.context {
                    Some(context) => columns.extend(
                        context
                            .values()
                            .map(|jaql| self.column(source, widget_id, jaql)),
                    ),
                    None => columns.push(self.column(source, widget_id, &item.jaql)),
                }
            }
        }

        columns
    }

    fn column(
        &self,
        source: ColumnSource,
        widget_id: Option<&str>,
        jaql: &Jaql,
    ) -> DashboardColumn {
        DashboardColumn {
            dashboard_name: self.title.clone(),
            source,
            widget_id: widget_id.map(str::to_owned),
            table: jaql.table.as_deref().unwrap_or(UNKNOWN_TABLE).to_owned(),
            column: jaql.column.as_deref().unwrap_or(UNKNOWN_COLUMN).to_owned(),
        }
    }
}

/// Keep the first use of each table and column pair.
fn distinct(columns: Vec<DashboardColumn>) -> Vec<DashboardColumn> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|c| seen.insert((c.table.clone(), c.column.clone())))
        .collect()
}

/// Whether a share is held by a user or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    /// A user, named by email address.
    User,
    /// A group, named by group name.
    Group,
}

/// One row of the share report produced by [Client::dashboard_shares].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardShare {
    /// The dashboard title.
    pub dashboard: String,
    /// The kind of share. `None` if the dashboard has no shares, or the
    /// share could not be resolved.
    #[serde(rename = "type")]
    pub kind: Option<ShareKind>,
    /// The email address of the user, or the name of the group.
    pub name: Option<String>,
}

impl<T: Transport> Client<T> {
    /// Fetch a single page of dashboards.
    pub fn search_dashboards(&self, skip: usize, limit: usize) -> Result<Vec<Dashboard>, Error> {
        self.logged(|| self.search_page("", skip, limit))
    }

    /// Fetch every dashboard matching the search text, one page of
    /// [PAGE_SIZE] at a time. An empty search matches everything.
    ///
    /// Paging stops at the first short page, or at a page that holds no
    /// dashboard not seen before.
    pub fn all_dashboards(&self, search: &str) -> Result<Vec<Dashboard>, Error> {
        self.logged(|| {
            let mut dashboards = Vec::new();
            let mut seen = HashSet::new();
            let mut skip = 0;

            loop {
                let page = self.search_page(search, skip, PAGE_SIZE)?;
                let fetched = page.len();
                let before = dashboards.len();
                dashboards.extend(page.into_iter().filter(|d| seen.insert(d.oid.clone())));

                if fetched < PAGE_SIZE {
                    break;
                }

                if dashboards.len() == before {
                    warn!("Dashboard search returned no new dashboards at skip={skip}, stopping");
                    break;
                }

                skip += fetched;
            }

            info!("Retrieved {} dashboards", dashboards.len());
            Ok(dashboards)
        })
    }

    fn search_page(
        &self,
        search: &str,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Dashboard>, Error> {
        debug!("Fetching dashboards (limit={limit}, skip={skip})");
        let page = self.roundtrip(SearchDashboards {
            search,
            skip,
            limit,
        })?;

        debug!("Retrieved {} dashboards", page.items.len());
        Ok(page.items)
    }

    /// Export a dashboard by id.
    pub fn export_dashboard(&self, id: &str) -> Result<ExportedDashboard, Error> {
        self.logged(|| {
            let exported = self.roundtrip(ExportDashboard { id })?;
            exported.into_iter().next().ok_or_else(|| {
                let err = Error::NotFound(format!("Export of dashboard '{id}'"));
                error!("{err}");
                err
            })
        })
    }

    /// The distinct table and column pairs used by the filters and widgets of
    /// the dashboard with the given title. Each pair is reported at its first
    /// use.
    pub fn get_dashboard_columns(&self, name: &str) -> Result<Vec<DashboardColumn>, Error> {
        self.logged(|| {
            info!("Starting to retrieve columns from dashboard: {name}");
            let Some(dashboard) = self
                .all_dashboards(name)?
                .into_iter()
                .find(|d| d.title == name)
            else {
                let err = Error::NotFound(format!("Dashboard '{name}'"));
                error!("{err}");
                return Err(err);
            };

            info!("Found dashboard '{name}' with ID: {}", dashboard.oid);
            let columns = distinct(self.export_dashboard(&dashboard.oid)?.columns());

            info!("Retrieved {} distinct columns from dashboard '{name}'", columns.len());
            Ok(columns)
        })
    }

    /// Resolve the shares of each dashboard to user emails and group names.
    ///
    /// Every share yields one row; a dashboard without shares yields a single
    /// row with no kind and no name.
    pub fn dashboard_shares(
        &self,
        dashboards: &[Dashboard],
    ) -> Result<Vec<DashboardShare>, Error> {
        self.logged(|| {
            let users = self.roundtrip(GetUsers)?;
            let groups = self.roundtrip(GetGroups)?;

            let resolve = |share: &Share| match share.kind.as_str() {
                "user" => users
                    .iter()
                    .find(|u| u.id == share.share_id)
                    .map(|u| (ShareKind::User, u.email.clone())),
                "group" => groups
                    .iter()
                    .find(|g| g.id == share.share_id)
                    .map(|g| (ShareKind::Group, g.name.clone())),
                _ => None,
            };

            let mut rows = Vec::new();
            for dashboard in dashboards {
                if dashboard.shares.is_empty() {
                    rows.push(DashboardShare {
                        dashboard: dashboard.title.clone(),
                        kind: None,
                        name: None,
                    });
                    continue;
                }

                for share in &dashboard.shares {
                    let (kind, name) = resolve(share).unzip();
                    rows.push(DashboardShare {
                        dashboard: dashboard.title.clone(),
                        kind,
                        name,
                    });
                }
            }

            info!("Parsed {} dashboard shares", rows.len());
            Ok(rows)
        })
    }
}
