use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reportmd::markdown::UNAVAILABLE_MARKER;
use reportmd::report::{select_report, ReportSource, ReportView, NO_DATA, SELECT_PROMPT};
use reportmd::{AgentConfig, ProcessingAgent};

fn write_data_dir() -> tempfile::TempDir
{   let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("filters.json")
    , r#"{"2025": ["Q1", "Q2"], "2024": ["Q3", "Q4"]}"#
    ).unwrap();
    std::fs::write(
      dir.path().join("reports.json")
    , r#"{
          "2025": {
            "Q1": {"revenue": 1200, "regions": ["north", "south"]},
            "Q2": "Report is being prepared."
          }
        }"#
    ).unwrap();
    dir
}

fn agent() -> ProcessingAgent
{   ProcessingAgent::unconfigured(AgentConfig::default())
}

#[tokio::test]
async fn test_directory_filters()
{   let dir = write_data_dir();
    let filters = ReportSource::directory(dir.path())
      .filters()
      .await
      .unwrap();

    assert_eq!(filters.years(), vec!["2025", "2024"]);
    assert_eq!(filters.quarters("2024"), vec!["Q3", "Q4"]);
}

#[tokio::test]
async fn test_incomplete_selection_prompts()
{   let dir = write_data_dir();
    let source = ReportSource::directory(dir.path());

    let view = select_report(&agent(), &source, Some("2025"), None).await;
    assert_eq!(view, ReportView::Prompt(SELECT_PROMPT.to_string()));

    let view = select_report(&agent(), &source, None, Some("Q1")).await;
    assert_eq!(view, ReportView::Prompt(SELECT_PROMPT.to_string()));
}

#[tokio::test]
async fn test_empty_selection_prompts()
{   let dir = write_data_dir();
    let source = ReportSource::directory(dir.path());

    let view = select_report(&agent(), &source, Some(""), Some("Q1")).await;
    assert_eq!(view, ReportView::Prompt(SELECT_PROMPT.to_string()));

    let view = select_report(&agent(), &source, Some("2025"), Some("")).await;
    assert_eq!(view, ReportView::Prompt(SELECT_PROMPT.to_string()));
}

#[tokio::test]
async fn test_report_object_goes_through_agent()
{   let dir = write_data_dir();
    let source = ReportSource::directory(dir.path());

    let view = select_report(&agent(), &source, Some("2025"), Some("Q1")).await;

    match view
    {   ReportView::Processed(markdown) => {
          assert!(markdown.contains(UNAVAILABLE_MARKER));
          assert!(markdown.contains("\"revenue\": 1200"));
        }
      , other => panic!("expected processed view, got {:?}", other)
    }
}

#[tokio::test]
async fn test_status_and_missing_entries()
{   let dir = write_data_dir();
    let source = ReportSource::directory(dir.path());

    assert_eq!(
      select_report(&agent(), &source, Some("2025"), Some("Q2")).await
    , ReportView::Status("Report is being prepared.".to_string())
    );
    assert_eq!(
      select_report(&agent(), &source, Some("2024"), Some("Q3")).await
    , ReportView::Status(NO_DATA.to_string())
    );
}

#[tokio::test]
async fn test_missing_data_is_fetch_error()
{   let dir = tempfile::tempdir().unwrap();
    let source = ReportSource::directory(dir.path());

    let view = select_report(&agent(), &source, Some("2025"), Some("Q1")).await;

    assert!(matches!(view, ReportView::FetchError(_)));
}

#[tokio::test]
async fn test_http_source()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/data/filters.json"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({"2023": ["Q4"]}))
      )
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/data/reports.json"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!({"2023": {"Q4": "Closed"}}))
      )
      .mount(&server)
      .await;

    let source = ReportSource::http(format!("{}/", server.uri()));

    let filters = source.filters().await.unwrap();
    assert_eq!(filters.years(), vec!["2023"]);
    assert_eq!(
      select_report(&agent(), &source, Some("2023"), Some("Q4")).await
    , ReportView::Status("Closed".to_string())
    );
}

#[tokio::test]
async fn test_http_error_is_fetch_error()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let source = ReportSource::http(server.uri());
    let view = select_report(&agent(), &source, Some("2023"), Some("Q4")).await;

    match view
    {   ReportView::FetchError(message) => assert!(message.contains("404"))
      , other => panic!("expected fetch error, got {:?}", other)
    }
}
