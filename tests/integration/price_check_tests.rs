// Price-check flow: fetch, extract, record, notify

use super::*;
use chrono::NaiveDate;
use pricewatch::models::PriceRecord;
use pricewatch::plugins::notifiers::NotifyOutcome;
use pricewatch::AppError;
use rstest::rstest;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

async fn serve_page(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dp/B0CQ1HP3RX/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_fetcher_sends_browser_headers() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", TEST_USER_AGENT))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&test_scraper_config(5))?;
    let body = fetcher.fetch(&format!("{}/page", server.uri())).await?;
    assert_eq!(body, "<html>ok</html>");
    Ok(())
}

#[tokio::test]
async fn test_fetcher_non_success_status_is_network_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&test_scraper_config(5))?;
    let result = fetcher.fetch(&server.uri()).await;
    assert!(matches!(result, Err(AppError::Network(_))));
    Ok(())
}

#[tokio::test]
async fn test_fetcher_timeout_is_network_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(&test_scraper_config(1))?;
    let result = fetcher.fetch(&server.uri()).await;
    assert!(matches!(result, Err(AppError::Network(_))));
    Ok(())
}

#[tokio::test]
async fn test_check_records_and_alerts_below_target() -> anyhow::Result<()> {
    let server = serve_page(product_page("JBL Tune 520BT", Some(("29", "99")))).await;
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("prices.csv");
    let mailer = RecordingMailer::default();

    let checker = create_test_checker(
        &log_path,
        Decimal::from(50),
        credentials(Some("me@example.com"), Some("app-password")),
        mailer.clone(),
    )?;

    let url = format!("{}/dp/B0CQ1HP3RX/", server.uri());
    let result = checker.check(&url, today()).await?;

    assert_eq!(result.record.title, "JBL Tune 520BT");
    assert_eq!(result.record.price, Some(Decimal::new(2999, 2)));
    assert_eq!(result.notification, NotifyOutcome::Sent);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.address, "me@example.com");
    assert_eq!(sent[0].1.url, url);

    let content = std::fs::read_to_string(&log_path)?;
    assert_eq!(
        content,
        format!("Title,Price,Date,URL\nJBL Tune 520BT,29.99,2024-03-01,{}\n", url)
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_price_still_logged() -> anyhow::Result<()> {
    let server = serve_page(product_page("JBL Tune 520BT", None)).await;
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("prices.csv");
    let mailer = RecordingMailer::default();

    let checker = create_test_checker(
        &log_path,
        Decimal::from(50),
        credentials(Some("me@example.com"), Some("app-password")),
        mailer.clone(),
    )?;

    let url = format!("{}/dp/B0CQ1HP3RX/", server.uri());
    let result = checker.check(&url, today()).await?;

    assert_eq!(result.record.price, None);
    assert_eq!(result.notification, NotifyOutcome::NoPrice);
    assert_eq!(mailer.count(), 0);

    let records = PriceLog::new(&log_path).read_all()?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].price, None);
    Ok(())
}

#[tokio::test]
async fn test_missing_title_aborts_without_logging() -> anyhow::Result<()> {
    let server = serve_page("<html><body><p>Robot check</p></body></html>".to_string()).await;
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("prices.csv");

    let checker = create_test_checker(
        &log_path,
        Decimal::from(50),
        credentials(None, None),
        RecordingMailer::default(),
    )?;

    let result = checker
        .check(&format!("{}/dp/B0CQ1HP3RX/", server.uri()), today())
        .await;
    assert!(matches!(result, Err(AppError::Extraction { .. })));
    assert!(!log_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_aborts_without_logging() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("prices.csv");
    let checker = create_test_checker(
        &log_path,
        Decimal::from(50),
        credentials(None, None),
        RecordingMailer::default(),
    )?;

    let result = checker.check(&server.uri(), today()).await;
    assert!(matches!(result, Err(AppError::Network(_))));
    assert!(!log_path.exists());
    Ok(())
}

#[tokio::test]
async fn test_repeated_checks_append_one_row_each() -> anyhow::Result<()> {
    let server = serve_page(product_page("JBL Tune 520BT", Some(("54", "95")))).await;
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("prices.csv");
    let checker = create_test_checker(
        &log_path,
        Decimal::from(50),
        credentials(None, None),
        RecordingMailer::default(),
    )?;

    let url = format!("{}/dp/B0CQ1HP3RX/", server.uri());
    for _ in 0..4 {
        checker.check(&url, today()).await?;
    }

    let content = std::fs::read_to_string(&log_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Title,Price,Date,URL");
    assert!(lines[1..].iter().all(|l| *l == lines[1]));
    Ok(())
}

#[rstest]
#[case::sent(Some(Decimal::new(4499, 2)), Some("me@example.com"), Some("pw"), NotifyOutcome::Sent, 1)]
#[case::no_price(None, Some("me@example.com"), Some("pw"), NotifyOutcome::NoPrice, 0)]
#[case::at_target(Some(Decimal::from(50)), Some("me@example.com"), Some("pw"), NotifyOutcome::AboveThreshold, 0)]
#[case::above_target(Some(Decimal::new(5001, 2)), Some("me@example.com"), Some("pw"), NotifyOutcome::AboveThreshold, 0)]
#[case::no_address(Some(Decimal::new(4499, 2)), None, Some("pw"), NotifyOutcome::MissingCredentials, 0)]
#[case::no_password(Some(Decimal::new(4499, 2)), Some("me@example.com"), None, NotifyOutcome::MissingCredentials, 0)]
#[case::empty_password(Some(Decimal::new(4499, 2)), Some("me@example.com"), Some(""), NotifyOutcome::MissingCredentials, 0)]
#[tokio::test]
async fn test_notifier_conditions(
    #[case] price: Option<Decimal>,
    #[case] address: Option<&str>,
    #[case] password: Option<&str>,
    #[case] expected: NotifyOutcome,
    #[case] messages: usize,
) {
    let mailer = RecordingMailer::default();
    let notifier = PriceAlertNotifier::new(
        Decimal::from(50),
        Box::new(credentials(address, password)),
        Box::new(mailer.clone()),
    );

    let record = PriceRecord {
        title: "JBL Tune 520BT".to_string(),
        price,
        date: today(),
        url: "https://example.com/dp/1".to_string(),
    };

    let outcome = notifier.notify(&record).await.unwrap();
    assert_eq!(outcome, expected);
    assert_eq!(mailer.count(), messages);
}
