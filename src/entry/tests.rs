use super::bibtex::{parse_file, parse_str};
use super::*;
use std::io::Write;

const SAMPLE: &str = r#"
@article{vaswani2017,
  title   = {Attention Is All You Need},
  author  = {Vaswani, Ashish and Shazeer, Noam},
  journal = {Advances in Neural Information Processing Systems},
  year    = {2017},
  doi     = {10.48550/arXiv.1706.03762}
}

@inproceedings{he2016,
  title     = {Deep Residual Learning for Image Recognition},
  author    = {He, Kaiming and Zhang, Xiangyu},
  booktitle = {CVPR},
  year      = 2016
}

@misc{notitle,
  author = {Anonymous},
  year   = {2020}
}
"#;

#[test]
fn test_parse_str_reads_fields_in_order() {
    let entries = parse_str(SAMPLE).expect("parses");
    assert_eq!(entries.len(), 3);

    let first = &entries[0];
    assert_eq!(first.id, "vaswani2017");
    assert_eq!(first.title.as_deref(), Some("Attention Is All You Need"));
    assert_eq!(first.author.as_deref(), Some("Vaswani, Ashish and Shazeer, Noam"));
    assert_eq!(first.year.as_deref(), Some("2017"));
    assert_eq!(first.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));

    assert_eq!(entries[1].id, "he2016");
    assert_eq!(entries[1].year.as_deref(), Some("2016"));
    assert!(entries[1].doi.is_none());

    assert_eq!(entries[2].id, "notitle");
    assert!(entries[2].title.is_none());
}

#[test]
fn test_parse_str_strips_protective_braces() {
    let entries = parse_str("@article{k, title = {{BERT}: Pre-training of {D}eep Models}}")
        .expect("parses");
    assert_eq!(
        entries[0].title.as_deref(),
        Some("BERT: Pre-training of Deep Models")
    );
}

#[test]
fn test_parse_str_uses_date_when_year_missing() {
    let entries =
        parse_str("@online{k, title = {Some Page}, date = {2021-04-01}}").expect("parses");
    assert_eq!(entries[0].year.as_deref(), Some("2021-04-01"));
}

#[test]
fn test_parse_str_recovers_from_broken_entry() {
    let content = r#"
@article{good1,
  title = {First Good Entry},
  year = {2019}
}

@article{broken,
  title = {Unclosed brace,
  year = {2019}

@article{good2,
  title = {Second Good Entry},
  journal = undefinedabbrev
}

@article{good3,
  title = {Third Good Entry}
}
"#;
    let entries = parse_str(content).expect("recovers");
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert!(ids.contains(&"good1"), "ids: {ids:?}");
    assert!(ids.contains(&"good3"), "ids: {ids:?}");
    assert!(!ids.contains(&"broken"), "ids: {ids:?}");
}

#[test]
fn test_parse_str_no_entries() {
    assert!(matches!(parse_str(""), Err(ParseError::NoEntries)));
    assert!(matches!(
        parse_str("just some prose, no entries"),
        Err(ParseError::NoEntries)
    ));
}

#[test]
fn test_parse_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let entries = parse_file(file.path()).expect("parses file");
    assert_eq!(entries.len(), 3);
}

#[test]
fn test_parse_file_missing() {
    let err = parse_file("/definitely/not/here.bib").unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.to_string().contains("here.bib"));
}

#[test]
fn test_citation_entry_blank_fields_are_none() {
    let entry = CitationEntry::new("k")
        .with_title("  ")
        .with_author("")
        .with_year(" 2020 ")
        .with_doi("\t");
    assert!(entry.title.is_none());
    assert!(entry.author.is_none());
    assert_eq!(entry.year.as_deref(), Some("2020"));
    assert!(entry.doi.is_none());
}

#[test]
fn test_citation_entry_from_fields() {
    let entry = CitationEntry::from_fields(
        "k",
        [
            ("Title", "A Title"),
            ("AUTHOR", "Doe, J."),
            ("journal", "ignored"),
            ("doi", "10.1/x"),
        ],
    );
    assert_eq!(entry.title.as_deref(), Some("A Title"));
    assert_eq!(entry.author.as_deref(), Some("Doe, J."));
    assert_eq!(entry.doi.as_deref(), Some("10.1/x"));
    assert!(entry.year.is_none());
}
