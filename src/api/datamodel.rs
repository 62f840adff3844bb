//! API operations concerning data models and their build schedules.

use std::{collections::HashSet, fmt::Display, str::FromStr};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    Client, Error, Transport,
    api::{ApiRequest, JsonResponse, Method},
    dashboard::GetDataModelDashboards,
};

/// A data model, as listed in the schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataModel {
    /// The data model id.
    pub oid: String,
    /// The data model title.
    pub title: String,
}

impl JsonResponse for DataModel {}

/// A dataset within a data model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Dataset {
    /// The dataset id.
    pub oid: String,
}

impl JsonResponse for Dataset {}

/// A table within a dataset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetTable {
    /// The table name.
    #[serde(default)]
    pub name: Option<String>,
    /// The table's columns.
    #[serde(default)]
    pub columns: Vec<DatasetColumn>,
}

impl JsonResponse for DatasetTable {}

/// A column of a [DatasetTable].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetColumn {
    /// The column name.
    #[serde(default)]
    pub name: Option<String>,
}

/// One column of a data model, as produced by
/// [Client::get_datamodel_columns].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataModelColumn {
    /// The data model id.
    pub datamodel_id: String,
    /// The data model title.
    pub datamodel_name: String,
    /// The table name.
    pub table: String,
    /// The column name.
    pub column: String,
}

/// A data model column and whether any dashboard built on the data model
/// uses it, as produced by [Client::get_unused_columns].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnUsage {
    /// The data model id.
    pub datamodel_id: String,
    /// The data model title.
    pub datamodel_name: String,
    /// The table name.
    pub table: String,
    /// The column name.
    pub column: String,
    /// Whether a dashboard filter or widget uses the column.
    pub used: bool,
}

/// List every data model.
#[derive(Debug, Clone, Copy)]
pub struct GetDataModels;

impl ApiRequest for GetDataModels {
    type Response = Vec<DataModel>;

    fn path(&self) -> String {
        "/api/v2/datamodels/schema".to_string()
    }
}

/// List the datasets of a data model.
#[derive(Debug, Clone)]
pub struct GetDatasets<'a> {
    /// The data model id.
    pub datamodel_id: &'a str,
}

impl ApiRequest for GetDatasets<'_> {
    type Response = Vec<Dataset>;

    fn path(&self) -> String {
        format!("/api/v2/datamodels/{}/schema/datasets", self.datamodel_id)
    }
}

/// List the tables of a dataset.
#[derive(Debug, Clone)]
pub struct GetDatasetTables<'a> {
    /// The data model id.
    pub datamodel_id: &'a str,
    /// The dataset id.
    pub dataset_id: &'a str,
}

impl ApiRequest for GetDatasetTables<'_> {
    type Response = Vec<DatasetTable>;

    fn path(&self) -> String {
        format!(
            "/api/v2/datamodels/{}/schema/datasets/{}/tables",
            self.datamodel_id, self.dataset_id
        )
    }
}

/// The kind of build a schedule runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildType {
    /// Append new data.
    #[default]
    Accumulate,
    /// Rebuild everything.
    Full,
    /// Rebuild only what changed in the schema.
    SchemaChanges,
}

impl BuildType {
    /// The name used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Accumulate => "ACCUMULATE",
            BuildType::Full => "FULL",
            BuildType::SchemaChanges => "SCHEMA_CHANGES",
        }
    }
}

impl Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ACCUMULATE" => Ok(BuildType::Accumulate),
            "FULL" => Ok(BuildType::Full),
            "SCHEMA_CHANGES" => Ok(BuildType::SchemaChanges),
            _ => Err(Error::InvalidArgument(format!("unknown build type: {s}"))),
        }
    }
}

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Build the cron expression for a weekly schedule.
///
/// `days` are three-letter day names (`SUN` to `SAT`, any case), or the
/// single entry `*` for every day. Times are in UTC.
pub fn cron_string(days: &[String], hour: u8, minute: u8) -> Result<String, Error> {
    if hour > 23 {
        return Err(Error::InvalidArgument(format!(
            "hour must be between 0 and 23, got {hour}"
        )));
    }

    if minute > 59 {
        return Err(Error::InvalidArgument(format!(
            "minute must be between 0 and 59, got {minute}"
        )));
    }

    let days = match days {
        [] => return Err(Error::InvalidArgument("no days given".to_string())),
        [all] if all == "*" => "0,1,2,3,4,5,6".to_string(),
        days => days
            .iter()
            .map(|day| {
                let upper = day.to_ascii_uppercase();
                WEEKDAYS
                    .iter()
                    .position(|d| *d == upper)
                    .map(|n| n.to_string())
                    .ok_or_else(|| Error::InvalidArgument(format!("unknown day: {day}")))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(","),
    };

    Ok(format!("{minute} {hour} * * {days}"))
}

/// The payload of a build schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// The cron expression, see [cron_string].
    pub cron_string: String,
    /// The kind of build to run.
    pub build_type: BuildType,
    /// The days as given by the caller.
    pub days_of_week: Vec<String>,
    /// The hour, in UTC.
    pub hour: u8,
    /// The minute.
    pub minute: u8,
}

/// Create a build schedule for a data model.
#[derive(Debug, Clone)]
pub struct CreateSchedule<'a> {
    /// The data model id.
    pub datamodel_id: &'a str,
    /// The schedule.
    pub schedule: &'a Schedule,
}

impl ApiRequest for CreateSchedule<'_> {
    type Response = Value;

    fn method(&self) -> Method {
        Method::Post
    }

    fn path(&self) -> String {
        format!("/api/v2/datamodels/{}/schedule", self.datamodel_id)
    }

    fn body(&self) -> Option<impl Serialize> {
        Some(self.schedule)
    }
}

impl<T: Transport> Client<T> {
    /// Look up the id of a data model by title.
    pub fn datamodel_id(&self, name: &str) -> Result<String, Error> {
        self.logged(|| {
            debug!("Fetching DataModel ID for '{name}'");
            let models = self.roundtrip(GetDataModels)?;

            match models.into_iter().find(|m| m.title == name) {
                Some(model) => {
                    info!("DataModel ID for '{name}' is {}", model.oid);
                    Ok(model.oid)
                }
                None => {
                    let err = Error::NotFound(format!("DataModel '{name}'"));
                    error!("{err}");
                    Err(err)
                }
            }
        })
    }

    /// Every column of every table in a data model.
    ///
    /// Datasets whose tables can't be fetched are skipped, as are tables and
    /// columns without a name.
    pub fn get_datamodel_columns(&self, name: &str) -> Result<Vec<DataModelColumn>, Error> {
        self.logged(|| {
            info!("Fetching columns for DataModel: {name}");
            let datamodel_id = self.datamodel_id(name)?;
            let datasets = self.roundtrip(GetDatasets {
                datamodel_id: &datamodel_id,
            })?;

            if datasets.is_empty() {
                warn!("No datasets found for DataModel '{name}' (ID: {datamodel_id})");
            }

            let mut columns = Vec::new();
            for dataset in &datasets {
                let req = GetDatasetTables {
                    datamodel_id: &datamodel_id,
                    dataset_id: &dataset.oid,
                };

                let tables = match self.roundtrip(req) {
                    Ok(tables) => tables,
                    Err(e) => {
                        error!("Failed to fetch tables for DataSet ID '{}': {e}", dataset.oid);
                        continue;
                    }
                };

                for table in tables {
                    let Some(table_name) = table.name else {
                        warn!("Table in DataSet ID '{}' has no name. Skipping.", dataset.oid);
                        continue;
                    };

                    if table.columns.is_empty() {
                        warn!("Table '{table_name}' has no columns. Skipping.");
                    }

                    for column in table.columns {
                        let Some(column_name) = column.name else {
                            warn!("A column in table '{table_name}' has no name. Skipping.");
                            continue;
                        };

                        columns.push(DataModelColumn {
                            datamodel_id: datamodel_id.clone(),
                            datamodel_name: name.to_owned(),
                            table: table_name.clone(),
                            column: column_name,
                        });
                    }
                }
            }

            info!("Collected {} columns from DataModel '{name}'", columns.len());
            Ok(columns)
        })
    }

    /// Every column of a data model, flagged with whether any dashboard built
    /// on the data model uses it in a filter or widget.
    ///
    /// Returns no columns if no dashboard is built on the data model, or none
    /// is visible to the caller. Dashboards that fail to export are skipped.
    pub fn get_unused_columns(&self, name: &str) -> Result<Vec<ColumnUsage>, Error> {
        self.logged(|| {
            info!("Starting analysis for unused columns in DataModel: {name}");
            let columns = self.get_datamodel_columns(name)?;

            let dashboards = self.roundtrip(GetDataModelDashboards { datamodel: name })?;
            let ids: IndexSet<&str> = dashboards.iter().map(|d| d.oid.as_str()).collect();
            if ids.is_empty() {
                warn!(
                    "No dashboards are associated with the DataModel '{name}' or the user does \
                     not have access to them"
                );
                return Ok(Vec::new());
            }

            info!("Found {} dashboards using DataModel '{name}'", ids.len());
            let mut used = HashSet::new();
            for id in ids {
                match self.export_dashboard(id) {
                    Ok(dashboard) => used.extend(
                        dashboard
                            .columns()
                            .into_iter()
                            .map(|c| (c.table, c.column)),
                    ),
                    Err(e @ Error::Transport { .. }) => return Err(e),
                    Err(e) => error!("Failed to export dashboard with ID '{id}': {e}"),
                }
            }

            let usage: Vec<ColumnUsage> = columns
                .into_iter()
                .map(|c| ColumnUsage {
                    used: used.contains(&(c.table.clone(), c.column.clone())),
                    datamodel_id: c.datamodel_id,
                    datamodel_name: c.datamodel_name,
                    table: c.table,
                    column: c.column,
                })
                .collect();

            let used_count = usage.iter().filter(|c| c.used).count();
            info!("Total used columns: {used_count}");
            info!("Total unused columns: {}", usage.len() - used_count);
            Ok(usage)
        })
    }

    /// Create a weekly build schedule for a data model. See [cron_string]
    /// for the accepted days. Nothing is sent if the days or time are
    /// invalid.
    pub fn create_schedule_build(
        &self,
        name: &str,
        days: &[String],
        hour: u8,
        minute: u8,
        build_type: BuildType,
    ) -> Result<Value, Error> {
        self.logged(|| {
            let cron = cron_string(days, hour, minute).inspect_err(|e| error!("{e}"))?;
            debug!("Generated cron string: {cron}");

            let datamodel_id = self.datamodel_id(name)?;
            let schedule = Schedule {
                cron_string: cron,
                build_type,
                days_of_week: days.to_vec(),
                hour,
                minute,
            };

            debug!("Creating schedule build: {schedule:?}");
            let created = self.roundtrip(CreateSchedule {
                datamodel_id: &datamodel_id,
                schedule: &schedule,
            })?;

            info!("Schedule build created successfully for DataModel '{name}'");
            Ok(created)
        })
    }
}
