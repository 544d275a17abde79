//! Harvest every page of a PNCP endpoint and print one JSON record per line.
//!
//! Usage: pncp-harvest <path> [key=value ...]
//! e.g.   pncp-harvest /consulta/v1/contratacoes/publicacao dataInicial=20250101 dataFinal=20250131

use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};
use pncp_pricing::config::AppConfig;
use pncp_pricing::harvest::{Harvester, Params};
use tracing::info;

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(String, Params)> {
    let path = args
        .next()
        .ok_or_else(|| anyhow!("usage: pncp-harvest <path> [key=value ...]"))?;
    let mut params = Params::new();
    for kv in args {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("expected key=value, got {kv:?}");
        };
        params.insert(k.to_string(), v.to_string());
    }
    Ok((path, params))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    pncp_pricing::init_tracing();

    let (path, params) = parse_args(std::env::args().skip(1))?;
    let cfg = AppConfig::load_default()?;
    let harvester = Harvester::new(cfg.harvest)?;

    let records = tokio::select! {
        res = harvester.fetch_all(&path, &params) => res?,
        _ = tokio::signal::ctrl_c() => bail!("harvest of {path} interrupted"),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for r in &records {
        serde_json::to_writer(&mut out, r).context("writing record")?;
        out.write_all(b"\n").context("writing record")?;
    }
    out.flush()?;

    info!(target: "harvest", %path, records = records.len(), "done");
    Ok(())
}
