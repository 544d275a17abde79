// src/report.rs
//! Markdown justification report. Pure templating over computed results.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::compliance::ComplianceAlert;
use crate::model::Item;
use crate::stats::PriceStats;

const LEGAL_NOTE: &str = "Este relatório é um subsídio técnico e deve ser validado pela área demandante conforme Lei nº 14.133/2021 e normativos locais.";

pub fn render_markdown(
    term: &str,
    items: &[Item],
    stats: &PriceStats,
    alerts: &[ComplianceAlert],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Relatório de Justificativa de Preços - {term}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Gerado em: {}",
        generated_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Resumo estatístico");
    let _ = writeln!(out, "- Quantidade de evidências: {}", stats.count);
    let _ = writeln!(out, "- Média: R$ {:.2}", stats.mean);
    let _ = writeln!(out, "- Mediana: R$ {:.2}", stats.median);
    let _ = writeln!(out, "- Mínimo: R$ {:.2}", stats.min);
    let _ = writeln!(out, "- Máximo: R$ {:.2}", stats.max);
    let _ = writeln!(out, "- Desvio padrão: R$ {:.2}", stats.stdev);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Evidências");
    for item in items {
        let _ = writeln!(
            out,
            "- {} | {} | {} | R$ {:.2} | [origem]({})",
            item.award_date(),
            item.org(),
            item.supplier(),
            item.unit_price(),
            item.source_link()
        );
    }

    if !alerts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Alertas de conformidade");
        for a in alerts {
            let _ = writeln!(out, "- [{}] {}: {}", a.severity, a.code, a.message);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Observação legal");
    out.push_str(LEGAL_NOTE);
    out
}
