//! Integration tests for Citation Retrieval
//!
//! These tests run the full pipeline through the public API, against the mock
//! source and against the PubMed client talking to a local mock server.

use chrono::NaiveDate;
use citation_retrieval::models::CitationRecordBuilder;
use citation_retrieval::sources::MockSource;
use citation_retrieval::utils::{CitationRanker, RetryConfig, TermExtractor};
use citation_retrieval::{CitationService, PubMedClient, NO_CITATIONS_MESSAGE};
use mockito::Matcher;
use std::sync::Arc;

const API_KEY: &str = "test-key";

fn pubmed_service(server: &mockito::ServerGuard) -> CitationService {
    let client = PubMedClient::new(Some(API_KEY.to_string()))
        .unwrap()
        .with_base_url(server.url())
        .with_retry_config(RetryConfig::no_retry());
    CitationService::new(Arc::new(client)).with_ranker(CitationRanker::with_current_year(2025))
}

fn article_set(articles: &[&str]) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<PubmedArticleSet>{}</PubmedArticleSet>",
        articles.concat()
    )
}

fn article(title: &str, publication_type: &str, year: Option<&str>, authors: &[(&str, &str)]) -> String {
    let pub_date = year
        .map(|y| format!("<PubDate><Year>{}</Year><Month>Mar</Month></PubDate>", y))
        .unwrap_or_else(|| "<PubDate><MedlineDate>Spring</MedlineDate></PubDate>".to_string());
    let author_list: String = authors
        .iter()
        .map(|(last, initials)| {
            format!(
                "<Author><LastName>{}</LastName><Initials>{}</Initials></Author>",
                last, initials
            )
        })
        .collect();

    format!(
        "<PubmedArticle><MedlineCitation><Article>\
         <Journal><JournalIssue>{}</JournalIssue><Title>Neurology</Title></Journal>\
         <ArticleTitle>{}</ArticleTitle>\
         <AuthorList>{}</AuthorList>\
         <PublicationTypeList><PublicationType>{}</PublicationType></PublicationTypeList>\
         </Article></MedlineCitation></PubmedArticle>",
        pub_date, title, author_list, publication_type
    )
}

async fn mock_esearch(server: &mut mockito::ServerGuard, ids: &[&str]) -> mockito::Mock {
    let body = serde_json::json!({ "esearchresult": { "idlist": ids } });
    server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_efetch(server: &mut mockito::ServerGuard, body: String) -> mockito::Mock {
    server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::Any)
        .with_header("content-type", "text/xml")
        .with_body(body)
        .create_async()
        .await
}

/// Scenario A: a question with searchable terms but no remote results
#[tokio::test]
async fn test_alzheimers_question_without_results() {
    let query = "What genes are associated with Alzheimer's disease?";

    let terms = TermExtractor::new().extract(query);
    assert!(!terms.is_empty());
    assert!(terms.contains("alzheimer"));

    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("retmax".into(), "4".into()),
            Matcher::UrlEncoded("retmode".into(), "json".into()),
        ]))
        .with_body(r#"{"esearchresult":{"count":"0","idlist":[]}}"#)
        .create_async()
        .await;

    let result = pubmed_service(&server)
        .retrieve_and_rank_citations(query, 2)
        .await;

    search.assert_async().await;
    assert_eq!(result, vec![NO_CITATIONS_MESSAGE]);
}

/// Scenario B: one recent review for an APOE question
#[tokio::test]
async fn test_apoe_question_with_single_review() {
    let query = "Role of APOE in neurodegeneration";
    assert!(TermExtractor::new().extract(query).contains("APOE"));

    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/esearch.fcgi")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("term".into(), "APOE apoe neurodegeneration".into()),
            Matcher::UrlEncoded("retmax".into(), "2".into()),
            Matcher::UrlEncoded("api_key".into(), API_KEY.into()),
        ]))
        .with_body(r#"{"esearchresult":{"idlist":["36000001"]}}"#)
        .create_async()
        .await;
    let fetch = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::UrlEncoded("id".into(), "36000001".into()))
        .with_body(article_set(&[&article(
            "APOE in neurodegeneration",
            "Review",
            Some("2022"),
            &[("Smith", "J"), ("Doe", "AB")],
        )]))
        .create_async()
        .await;

    let result = pubmed_service(&server)
        .retrieve_and_rank_citations(query, 1)
        .await;

    search.assert_async().await;
    fetch.assert_async().await;
    assert_eq!(result.len(), 1);

    let lines: Vec<&str> = result[0].lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "--- Citation 1 ---");
    assert_eq!(lines[1], "Title of the paper: APOE in neurodegeneration");
    assert_eq!(lines[2], "Authors: Smith J, Doe AB");
    assert_eq!(lines[3], "Journal: Neurology");
    assert_eq!(
        lines[4],
        "[Link](https://www.google.com/search?q=APOE+in+neurodegeneration&btnI=I%27m%20Feeling%20Lucky)"
    );
}

/// Scenario C: a record without year or authors still formats
#[tokio::test]
async fn test_record_without_year_or_authors() {
    let mut server = mockito::Server::new_async().await;
    let _search = mock_esearch(&mut server, &["1"]).await;
    let _fetch = mock_efetch(
        &mut server,
        article_set(&[&article("Undated consortium report", "Journal Article", None, &[])]),
    )
    .await;

    let result = pubmed_service(&server)
        .retrieve_and_rank_citations("TREM2 microglia", 1)
        .await;

    assert_eq!(result.len(), 1);
    assert!(result[0].contains("Title of the paper: Undated consortium report\n"));
    assert!(result[0].contains("Authors: N/A\n"));
    assert_eq!(result[0].lines().count(), 5);
}

#[tokio::test]
async fn test_ranking_reorders_fetched_records() {
    let mut server = mockito::Server::new_async().await;
    let _search = mock_esearch(&mut server, &["1", "2", "3", "4"]).await;
    let _fetch = mock_efetch(
        &mut server,
        article_set(&[
            &article("Letter on SNCA", "Letter", Some("2025"), &[("Lee", "K")]),
            &article("Old SNCA trial", "Clinical Trial", Some("2001"), &[("Kim", "H")]),
            &article("SNCA review", "Review", Some("2018"), &[("Park", "S")]),
            &article("Recent SNCA article", "Journal Article", Some("2024"), &[("Cho", "Y")]),
        ]),
    )
    .await;

    let result = pubmed_service(&server)
        .retrieve_and_rank_citations("SNCA aggregation", 2)
        .await;

    assert_eq!(result.len(), 2);
    assert!(result[0].starts_with("--- Citation 1 ---\nTitle of the paper: SNCA review\n"));
    assert!(result[1].starts_with("--- Citation 2 ---\nTitle of the paper: Recent SNCA article\n"));
}

#[tokio::test]
async fn test_upstream_failure_yields_fallback() {
    let mut server = mockito::Server::new_async().await;
    let _search = mock_esearch(&mut server, &["1"]).await;
    let _fetch = server
        .mock("GET", "/efetch.fcgi")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;

    let result = pubmed_service(&server)
        .retrieve_and_rank_citations("APOE", 3)
        .await;

    assert_eq!(result, vec![NO_CITATIONS_MESSAGE]);
}

#[tokio::test]
async fn test_stop_word_question_never_reaches_the_source() {
    let source = Arc::new(MockSource::new());
    let service = CitationService::new(source.clone());

    let result = service
        .retrieve_and_rank_citations("What is the role of it in a me?", 3)
        .await;

    assert_eq!(result, vec![NO_CITATIONS_MESSAGE]);
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_concurrent_queries_are_independent() {
    let record = |title: &str| {
        CitationRecordBuilder::new()
            .title(title)
            .publication_type("Review")
            .publication_date(NaiveDate::from_ymd_opt(2023, 6, 1))
            .build()
    };
    let source = Arc::new(MockSource::with_records(vec![
        record("First"),
        record("Second"),
        record("Third"),
    ]));
    let service = CitationService::new(source.clone());

    let (one, two, none) = tokio::join!(
        service.retrieve_and_rank_citations("APOE neurodegeneration", 1),
        service.retrieve_and_rank_citations("MAPT-STX6 interaction", 2),
        service.retrieve_and_rank_citations("how is it?", 2),
    );

    assert_eq!(one.len(), 1);
    assert_eq!(two.len(), 2);
    assert!(two[1].starts_with("--- Citation 2 ---\nTitle of the paper: Second\n"));
    assert_eq!(none, vec![NO_CITATIONS_MESSAGE]);
    assert_eq!(source.calls().len(), 2);
}
