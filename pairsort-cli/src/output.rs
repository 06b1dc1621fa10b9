/// Output formatting: terminal table, JSON, share links.
use pairsort_core::{Item, Ranking};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: u32,
    #[serde(flatten)]
    item: &'a Item,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    items: Vec<JsonRankedItem<'a>>,
    comparisons: usize,
    token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    share_link: Option<String>,
}

/// Append the token to a base URL as the `r` query parameter.
pub fn share_link(base_url: &str, token: &str) -> String {
    let base = base_url.split('?').next().unwrap_or(base_url);
    format!("{base}?r={token}")
}

/// Pull the token out of a pasted share link, or return the input as is.
pub fn token_from_input(input: &str) -> &str {
    let input = input.trim();
    let Some((_, query)) = input.split_once('?') else {
        return input;
    };
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("r="))
        .unwrap_or(input)
}

/// Format results as a terminal table.
pub fn format_table(ranking: &Ranking) -> String {
    let label_width = ranking
        .items
        .iter()
        .map(|item| item.label.chars().count())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Item"

    let mut out = String::new();
    out.push_str(&format!("Rank | {:<label_width$} | Asset\n", "Item"));
    out.push_str(&format!("-----|-{}-|------\n", "-".repeat(label_width)));
    for (rank, item) in ranking.entries() {
        out.push_str(&format!("{rank:>4} | {:<label_width$} | {}\n", item.label, item.asset_ref));
    }
    out
}

/// Print results as a formatted terminal table.
pub fn print_table(ranking: &Ranking, comparisons: Option<usize>, token: &str, share_url: Option<&str>) {
    print!("{}", format_table(ranking));

    if let Some(comparisons) = comparisons {
        println!("\n{} items ranked after {} comparisons", ranking.len(), comparisons);
    }
    match share_url {
        Some(base) => println!("Share: {}", share_link(base, token)),
        None => println!("Share token: {token}"),
    }
}

/// Print results as JSON.
pub fn print_json(ranking: &Ranking, comparisons: usize, token: &str, share_url: Option<&str>) {
    let output = JsonOutput {
        items: ranking
            .entries()
            .map(|(rank, item)| JsonRankedItem { rank, item })
            .collect(),
        comparisons,
        token: token.to_string(),
        share_link: share_url.map(|base| share_link(base, token)),
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => crate::bail(format!("Failed to serialize results: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_replaces_existing_query() {
        assert_eq!(share_link("https://x.dev/sort", "AwEA"), "https://x.dev/sort?r=AwEA");
        assert_eq!(share_link("https://x.dev/sort?r=old", "AwEA"), "https://x.dev/sort?r=AwEA");
    }

    #[test]
    fn test_token_from_input() {
        assert_eq!(token_from_input("AwEAAg"), "AwEAAg");
        assert_eq!(token_from_input("https://x.dev/sort?r=AwEAAg"), "AwEAAg");
        assert_eq!(token_from_input("https://x.dev/sort?lang=en&r=AwEAAg"), "AwEAAg");
        assert_eq!(token_from_input(" AwEAAg \n"), "AwEAAg");
    }

    #[test]
    fn test_format_table_shares_rank_for_ties() {
        let ranking = Ranking {
            items: vec![
                Item::new(0, "Gold Ship", "Gold_Ship_(Race).png"),
                Item::new(1, "Tea", ""),
                Item::new(2, "Coffee", ""),
            ],
            ranks: vec![1, 1, 2],
        };
        let table = format_table(&ranking);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("   1 | Gold Ship"));
        assert!(lines[3].starts_with("   1 | Tea"));
        assert!(lines[4].starts_with("   2 | Coffee"));
    }
}
