//! Concatenate downloaded scripts into one attributed text blob.

use crate::types::DownloadedAsset;

/// Width of the `=` rule that closes each block.
pub const SEPARATOR_WIDTH: usize = 80;

/// Join assets into a snapshot.
///
/// Each asset contributes three fragments: a `// Source: <url>` line, the
/// body verbatim, and a blank-line-padded `=` rule. Fragments are joined
/// with `\n`. Bodies are not inspected.
pub fn combine(assets: &[DownloadedAsset]) -> String {
    let separator = format!("\n{}\n", "=".repeat(SEPARATOR_WIDTH));

    let headers: Vec<String> = assets
        .iter()
        .map(|a| format!("// Source: {}", a.url))
        .collect();

    let mut fragments: Vec<&str> = Vec::with_capacity(assets.len() * 3);

    for (asset, header) in assets.iter().zip(&headers) {
        fragments.push(header);
        fragments.push(&asset.body);
        fragments.push(&separator);
    }

    fragments.join("\n")
}
