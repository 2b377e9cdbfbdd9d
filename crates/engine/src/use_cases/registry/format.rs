//! Chat renderings of registry data.
//!
//! Discord markdown: `**bold**`, fenced blocks for aligned output, and
//! `<url>` to suppress link previews.

use std::collections::BTreeMap;

use tf2bdd_domain::{Player, SteamId};

const FENCE: &str = "```";
const TOTAL_LABEL: &str = "total";

/// Multi-line report for `!check`.
pub fn check_report(player: &Player) -> String {
    let mut lines = vec![
        String::new(),
        format!(
            ":skull_crossbones: **{} is a confirmed baddie** :skull_crossbones:",
            player.display_name()
        ),
        format!("**Attributes:** {}", player.attributes.join(", ")),
    ];

    for (idx, proof) in player.proof.iter().enumerate() {
        if proof.starts_with("http") {
            lines.push(format!("**Proof #{idx}:** <{proof}>"));
        } else {
            lines.push(format!("**Proof #{idx}:** {proof}"));
        }
    }

    lines.push(format!(
        "**Added on:** {}",
        player.created_on.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if player.author > 0 {
        lines.push(format!("**Author:** <@{}>", player.author));
    }
    lines.push(format!("**Profile:** <{}>", player.steam_id.profile_url()));

    lines.join("\n")
}

/// Every rendering of an id, for `!steamid`.
pub fn steam_id_block(steam_id: SteamId) -> String {
    format!(
        "{FENCE}\nSteam32: {}\nSteam:   {}\nSteam3:  {}\nSteam64: {}\n{FENCE}Profile: <{}>",
        steam_id.account_id(),
        steam_id.steam2(),
        steam_id.steam3(),
        steam_id,
        steam_id.profile_url(),
    )
}

/// Total plus per-attribute tallies, labels padded to the longest one.
pub fn count_block<'a, I>(players: I) -> String
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut total = 0usize;
    let mut tallies: BTreeMap<&str, usize> = BTreeMap::new();
    for player in players {
        total += 1;
        for attribute in &player.attributes {
            *tallies.entry(attribute.as_str()).or_default() += 1;
        }
    }

    let width = tallies
        .keys()
        .map(|label| label.len())
        .chain(std::iter::once(TOTAL_LABEL.len()))
        .max()
        .unwrap_or(TOTAL_LABEL.len());

    let mut out = String::from(FENCE);
    out.push('\n');
    out.push_str(&format!("{TOTAL_LABEL:<width$}: {total}\n"));
    for (label, count) in tallies {
        out.push_str(&format!("{label:<width$}: {count}\n"));
    }
    out.push_str(FENCE);
    out
}
