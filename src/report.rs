//! Year/quarter report data and the views a selection produces

use std::path::PathBuf;
use log::{debug, trace, error};
use serde_json::{Map, Value};

pub const FILTERS_FILE: &str = "filters.json";
pub const REPORTS_FILE: &str = "reports.json";
pub const SELECT_PROMPT: &str
  = "Please select a year and quarter to get the report data.";
pub const NO_DATA: &str = "No data available for this selection.";

/// Where `filters.json` and `reports.json` live
#[derive(Debug, Clone)]
pub enum ReportSource
{   /// Served under `{base_url}/data/`
    Http
    {   base_url: String
      , client: reqwest::Client
    }
  , /// Plain files in a local folder
    Directory(PathBuf)
}

impl ReportSource
{   pub fn http(base_url: impl Into<String>) -> Self
    {   ReportSource::Http
        {   base_url: base_url.into()
          , client: reqwest::Client::new()
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self
    {   ReportSource::Directory(path.into())
    }

    /// Location of a data file, for logs and errors
    pub fn location(&self, file: &str) -> String
    {   match self
        {   ReportSource::Http { base_url, .. } => {
              format!("{}/data/{}", base_url.trim_end_matches('/'), file)
            }
          , ReportSource::Directory(dir) => {
              dir.join(file).display().to_string()
            }
        }
    }

    async fn fetch(&self, file: &str)
      -> Result<Value, crate::error::Error>
    {   let location = self.location(file);
        debug!("Fetching {}", location);
        match self
        {   ReportSource::Http { client, .. } => {
              let response = client
                .get(&location)
                .send()
                .await
                .map_err(crate::error::Error::from)?;
              let status = response.status();
              trace!("{} -> {}", location, status);
              if !status.is_success()
              {   let message = response.text().await
                    .unwrap_or_else(|_|
                      "Unknown error".to_string()
                    );
                  return Err(crate::error::Error::ApiError
                  {   status: status.as_u16()
                    , message: format!("{}: {}", location, message)
                  });
              }
              response.json().await.map_err(|e| {
                crate::error::Error::ParseError(e.to_string())
              })
            }
          , ReportSource::Directory(_) => {
              let text = tokio::fs::read_to_string(&location).await?;
              Ok(serde_json::from_str(&text)?)
            }
        }
    }

    pub async fn filters(&self)
      -> Result<Filters, crate::error::Error>
    {   Filters::from_value(self.fetch(FILTERS_FILE).await?)
    }

    pub async fn reports(&self)
      -> Result<Reports, crate::error::Error>
    {   Reports::from_value(self.fetch(REPORTS_FILE).await?)
    }
}

fn expect_object(value: Value, what: &str)
  -> Result<Map<String, Value>, crate::error::Error>
{   match value
    {   Value::Object(map) => Ok(map)
      , other => Err(crate::error::Error::Json(
          format!("{} must be an object, found {}", what, other)
        ))
    }
}

/// year -> quarter labels, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters
{   entries: Vec<(String, Vec<String>)>
}

impl Filters
{   pub fn from_value(value: Value)
      -> Result<Self, crate::error::Error>
    {   let map = expect_object(value, FILTERS_FILE)?;
        let mut entries = Vec::with_capacity(map.len());
        for (year, quarters) in map
        {   let quarters: Vec<String> = serde_json::from_value(quarters)
              .map_err(|e| {
                crate::error::Error::Json(
                  format!("quarters for {}: {}", year, e)
                )
              })?;
            entries.push((year, quarters));
        }
        Ok(Filters { entries })
    }

    pub fn years(&self) -> Vec<&str>
    {   self.entries.iter().map(|(year, _)| year.as_str()).collect()
    }

    /// Empty for an unknown year
    pub fn quarters(&self, year: &str) -> Vec<&str>
    {   self.entries
          .iter()
          .find(|(y, _)| y == year)
          .map(|(_, quarters)| quarters.iter().map(String::as_str).collect())
          .unwrap_or_default()
    }
}

/// One year/quarter leaf of `reports.json`
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEntry
{   /// A report object to hand to the agent
    Data(Map<String, Value>)
  , /// Anything else, shown as text
    Status(String)
}

impl From<Value> for ReportEntry
{   fn from(value: Value) -> Self
    {   match value
        {   Value::Object(map) => ReportEntry::Data(map)
          , Value::String(text) => ReportEntry::Status(text)
          , other => ReportEntry::Status(other.to_string())
        }
    }
}

/// year -> quarter -> report entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reports
{   root: Map<String, Value>
}

impl Reports
{   pub fn from_value(value: Value)
      -> Result<Self, crate::error::Error>
    {   Ok(Reports { root: expect_object(value, REPORTS_FILE)? })
    }

    /// Missing year or quarter falls back to the no-data status
    pub fn entry(&self, year: &str, quarter: &str) -> ReportEntry
    {   self.root
          .get(year)
          .and_then(|y| y.get(quarter))
          .cloned()
          .map(ReportEntry::from)
          .unwrap_or_else(|| ReportEntry::Status(NO_DATA.to_string()))
    }
}

/// What a year/quarter selection renders to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportView
{   /// Selection incomplete
    Prompt(String)
  , /// Report object converted to markdown
    Processed(String)
  , /// Status text for the selection
    Status(String)
  , /// Report data could not be fetched
    FetchError(String)
}

impl ReportView
{   pub fn to_markdown(&self) -> String
    {   match self
        {   ReportView::Prompt(text) => text.clone()
          , ReportView::Processed(markdown) => format!(
              "### 📊 Report Data Processing Results\n\n\
               Data fetched from API and processed using OpenAI integration:\n\n{}",
              markdown
            )
          , ReportView::Status(text) => {
              format!("### 📋 Report Status\n\n{}", text)
            }
          , ReportView::FetchError(message) => format!(
              "### ❌ API Communication Error\n\n\
               Failed to fetch data from API: {}",
              message
            )
        }
    }
}

/// Resolve a selection against `source`, converting report objects with `agent`.
/// Empty year or quarter strings count as no selection.
pub async fn select_report(
  agent: &crate::agent::ProcessingAgent
, source: &ReportSource
, year: Option<&str>
, quarter: Option<&str>
) -> ReportView
{   let year = year.filter(|y| !y.is_empty());
    let quarter = quarter.filter(|q| !q.is_empty());
    let (Some(year), Some(quarter)) = (year, quarter) else
    {   return ReportView::Prompt(SELECT_PROMPT.to_string());
    };

    let reports = match source.reports().await
    {   Ok(reports) => reports
      , Err(e) => {
          error!("Failed to fetch reports: {}", e);
          return ReportView::FetchError(e.to_string());
        }
    };

    match reports.entry(year, quarter)
    {   ReportEntry::Data(map) => {
          debug!("Converting report {} {}", year, quarter);
          let markdown = agent
            .json_to_markdown(&Value::Object(map), None)
            .await;
          ReportView::Processed(markdown)
        }
      , ReportEntry::Status(text) => ReportView::Status(text)
    }
}
