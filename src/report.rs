use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::engine::plan::{CallLayout, Slot};
use crate::engine::select::is_unhealthy;
use crate::model::record::{Snapshot, WalletRecord, is_active};

/// Per-wallet health table, one row per record in wallet order.
pub fn render_table(snapshot: &Snapshot, native_symbol: &str) -> String {
    if snapshot.is_empty() {
        return "No wallets tracked.\n".to_string();
    }

    let mut out = String::new();
    let native_header = format!("NATIVE ({native_symbol})");
    let _ = writeln!(
        out,
        "{:<44} {:>14} {:>6} {:<14} {:<17} {}",
        "ADDRESS", native_header, "TXS", "HEALTH", "LAST ACTIVE", "HOLDINGS"
    );
    let _ = writeln!(out, "{}", "-".repeat(110));

    for record in snapshot.iter() {
        let flag = if is_unhealthy(record) { " !" } else { "" };
        let _ = writeln!(
            out,
            "{:<44} {:>14} {:>6} {:<14} {:<17} {}{}",
            record.address,
            truncate(&record.native_balance, 14),
            record.tx_count,
            health_cell(record),
            last_active_cell(record.last_active),
            holdings(record),
            flag,
        );
    }

    let unhealthy = snapshot.iter().filter(|r| is_unhealthy(r)).count();
    let _ = writeln!(
        out,
        "\n{} wallets, {} unhealthy, updated {}",
        snapshot.len(),
        unhealthy,
        timestamp(snapshot.completed_at),
    );
    out
}

/// Per-wallet slot layout with the batch size for `wallets` wallets.
pub fn render_layout(layout: &CallLayout, wallets: usize) -> String {
    let mut out = String::new();
    for (i, probe) in layout.slots().iter().enumerate() {
        let role = match probe.slot {
            Slot::Native => "native balance".to_string(),
            Slot::TokenBalance { token } => format!("{} balance", layout.token_keys()[token]),
            Slot::TokenDecimals { token } => format!("{} decimals", layout.token_keys()[token]),
            Slot::StakeGetter { stake, rank } => {
                format!("{} getter #{}", layout.stakes()[stake].key, rank + 1)
            }
            Slot::StakeInfo { stake } => format!("{} info", layout.stakes()[stake].key),
        };
        let optional = if probe.optional { " (optional)" } else { "" };
        let _ = writeln!(
            out,
            "  [{:>2}] {:<28} {} {}{}",
            i, role, probe.target, probe.method, optional
        );
    }
    let per = layout.calls_per_wallet();
    let _ = writeln!(out, "\ncallsPerWallet = {per}");
    let _ = writeln!(out, "{wallets} wallet(s) → {} calls in one batch", per * wallets);
    out
}

fn health_cell(record: &WalletRecord) -> String {
    match record.health {
        Some(h) => format!("{:>3} {}", h.score, h.label.display_label()),
        None => "  — Unknown".to_string(),
    }
}

fn last_active_cell(millis: Option<i64>) -> String {
    match millis {
        Some(ms) => timestamp(ms),
        None => "—".to_string(),
    }
}

fn holdings(record: &WalletRecord) -> String {
    let held: Vec<String> = record
        .tokens
        .iter()
        .chain(record.stakes.iter())
        .filter(|(_, v)| is_active(v))
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    if held.is_empty() {
        "—".to_string()
    } else {
        held.join(" ")
    }
}

fn timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}…")
    } else {
        s.to_string()
    }
}
