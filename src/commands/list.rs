// List commands - print tests, tags or reporters instead of running

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::config::RunConfiguration;
use crate::execution::TestCase;
use crate::report::ReporterRegistry;

/// Whether any listing mode was requested
pub fn is_listing(config: &RunConfiguration) -> bool {
    config.list_tests()
        || config.list_test_names_only()
        || config.list_tags()
        || config.list_reporters()
}

/// Run the requested listing; returns the number of items listed
pub fn handle_list(
    config: &RunConfiguration,
    registry: &ReporterRegistry,
    tests: &[TestCase],
) -> Result<usize> {
    let text = if config.list_reporters() {
        list_reporters(registry)
    } else {
        let matching: Vec<&TestCase> = tests
            .iter()
            .filter(|t| config.test_spec().matches(&t.info))
            .collect();
        if config.list_tags() {
            list_tags(config, &matching)
        } else if config.list_test_names_only() {
            list_test_names(&matching)
        } else {
            list_tests(config, &matching)
        }
    };

    let stream = config.stream();
    stream
        .write(&text.body)
        .and_then(|_| stream.flush())
        .context("Failed to write listing")?;
    Ok(text.count)
}

struct Listing {
    body: String,
    count: usize,
}

fn list_tests(config: &RunConfiguration, tests: &[&TestCase]) -> Listing {
    let mut body = if config.test_spec().has_filters() {
        "Matching test cases:\n".to_string()
    } else {
        "All available test cases:\n".to_string()
    };

    for test in tests {
        body.push_str(&format!("  {}\n", test.info.name));
        if !test.info.tags.is_empty() {
            body.push_str(&format!("      {}\n", test.info.tags_as_string()));
        }
    }
    body.push_str(&format!("{}\n\n", crate::report::tap::pluralise(tests.len(), "test case")));

    Listing {
        body,
        count: tests.len(),
    }
}

fn list_test_names(tests: &[&TestCase]) -> Listing {
    let body = tests
        .iter()
        .map(|t| format!("{}\n", t.info.name))
        .collect();
    Listing {
        body,
        count: tests.len(),
    }
}

fn list_tags(config: &RunConfiguration, tests: &[&TestCase]) -> Listing {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for test in tests {
        for tag in &test.info.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut body = if config.test_spec().has_filters() {
        "Tags for matching test cases:\n".to_string()
    } else {
        "All available tags:\n".to_string()
    };
    for (tag, count) in &counts {
        body.push_str(&format!("{:>4}  [{}]\n", count, tag));
    }
    body.push_str(&format!("{}\n\n", crate::report::tap::pluralise(counts.len(), "tag")));

    Listing {
        body,
        count: counts.len(),
    }
}

fn list_reporters(registry: &ReporterRegistry) -> Listing {
    let mut body = "Available reporters:\n".to_string();
    let mut count = 0;
    for (name, description) in registry.descriptions() {
        body.push_str(&format!("  {}:  {}\n", name, description));
        count += 1;
    }
    body.push('\n');

    Listing { body, count }
}
