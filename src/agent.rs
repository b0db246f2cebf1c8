//! Company profile agent
//!
//! One parameterized section pipeline (fetch → normalize → classify/format →
//! prompt → generate) drives all four report sections. Sections run
//! sequentially and every failure is converted into user-visible text at the
//! section boundary, so one failing section never blocks the rest of the
//! report.

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::classifier::GeoClassifier;
use crate::error::ProfileError;
use crate::finance::{FinanceAgent, PREVIOUS_QUARTER_END};
use crate::gemini::TextGenerator;
use crate::models::{fmt_amount, fmt_ratio, HoldingsSnapshot};
use crate::normalize::{harvest_addresses, harvest_officers};
use crate::registry::{CompanyRegistry, DEFAULT_STATE};
use crate::ticker::{TickerResolution, TickerResolver};
use crate::Result;

//
// ================= Sections =================
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ExecutiveSummary,
    KeyAddresses,
    KeyOfficers,
    KeyShareholders,
}

impl Section {
    /// Report order.
    pub const ALL: [Section; 4] = [
        Section::ExecutiveSummary,
        Section::KeyAddresses,
        Section::KeyOfficers,
        Section::KeyShareholders,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Section::ExecutiveSummary => "executive_summary",
            Section::KeyAddresses => "key_addresses",
            Section::KeyOfficers => "key_officers",
            Section::KeyShareholders => "key_shareholders",
        }
    }
}

//
// ================= Prompts =================
//

const ADDRESSES_GUARD: &str = "\
Begin the paragraph with the bold heading **Key Addresses**.

• Quote up to **three** illustrative U.S. addresses verbatim.
• Add 1-2 concise sentences that describe the international footprint, \
**grouping** the non-U.S. countries supplied into their continents \
(e.g. “Europe, Asia-Pacific and Africa”). Do **not** list every country.
• Base every statement strictly on the data provided – no invented sites.";

const OFFICERS_SAMPLE: &str = "\
**Key Officers**
ONEREP LLC was first established in Eastern Europe in 2015 and incorporated in
the US in October 2018. The Founder & CEO, Dzmitry Shelest …  The current CTO,
Mikalai Shershan …  The SVP of Strategic Partnerships, Mark Kapczynski …";

const SHAREHOLDERS_GUARD: &str = "\
You are writing the **Key Shareholders** paragraph for an equity-research report.

• Begin with the bold heading **Key Shareholders**.
• Summarise the figures below in 3-5 sentences.
• Mention quarter-on-quarter changes only when the change is > 5 %.
• Base every statement solely on the bullets. Avoid hype.";

fn officers_guard(company: &str) -> String {
    format!(
        "Begin with the bold heading **Key Officers – {company}**.

You are writing the **Key Officers – {company}** paragraph for an analyst report.

• Base every statement **only** on the officers supplied.
• Do **not** copy wording from the sample – it is illustrative only.
• Do **not** invent biographies or commentary that is not present in the data."
    )
}

fn officers_fallback_prompt(company: &str) -> String {
    format!(
        "You are writing the **Key Officers** section of an equity-research report.

Write exactly in this order:
1. A heading line: **Key Officers**
2. Use your own knowledge to identify the current CEO and other C-suite leaders of {company}.

• In 3-4 sentences, state each person’s role and, briefly, their background.
• If you are unsure who the executives are, say so clearly instead of guessing."
    )
}

fn bullet_lines(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

//
// ================= Agent =================
//

/// Composes the four report sections from injected external collaborators.
pub struct ProfileAgent {
    registry: Arc<dyn CompanyRegistry>,
    finance: Arc<dyn FinanceAgent>,
    llm: Arc<dyn TextGenerator>,
    resolver: TickerResolver,
}

impl ProfileAgent {
    pub fn new(
        registry: Arc<dyn CompanyRegistry>,
        finance: Arc<dyn FinanceAgent>,
        llm: Arc<dyn TextGenerator>,
    ) -> Self {
        let resolver = TickerResolver::new(finance.clone());
        Self {
            registry,
            finance,
            llm,
            resolver,
        }
    }

    /// Build the combined report: all sections in order, sequentially
    /// awaited, joined with blank lines.
    pub async fn company_profile(&self, company: &str) -> String {
        let company = company.trim();
        info!("Building company profile for {}", company);

        let mut rendered = Vec::with_capacity(Section::ALL.len());
        for section in Section::ALL {
            rendered.push(self.render(section, company).await);
        }
        rendered.join("\n\n")
    }

    /// Render one section. This is the error boundary: any failure below it
    /// becomes a user-visible apology naming the company, with the error
    /// embedded for operator debugging.
    pub async fn render(&self, section: Section, company: &str) -> String {
        match self.render_inner(section, company).await {
            Ok(text) => text,
            Err(e) => {
                error!("Section {} failed for {}: {}", section.name(), company, e);
                apology(company, &e)
            }
        }
    }

    async fn render_inner(&self, section: Section, company: &str) -> Result<String> {
        match section {
            Section::ExecutiveSummary => Ok(executive_summary(company)),
            Section::KeyAddresses => self.key_addresses(company).await,
            Section::KeyOfficers => self.key_officers(company).await,
            Section::KeyShareholders => self.key_shareholders(company).await,
        }
    }

    /// Fetch the PDS payload and pull out the company record, if any.
    async fn company_record(&self, company: &str) -> Result<Value> {
        let data = self.registry.search(company, DEFAULT_STATE).await?;
        Ok(data
            .company_record()
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn key_addresses(&self, company: &str) -> Result<String> {
        let record = self.company_record(company).await?;
        let raw = record
            .get("addresses")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let clean = harvest_addresses(&raw);
        if clean.is_empty() {
            info!("No usable addresses for {}", company);
            return Ok("No addresses found.".to_string());
        }

        let bucket = GeoClassifier::classify(&clean);
        let prompt = format!(
            "{}\n\n### Data\n• U.S. addresses: {}\n• Non-U.S. country codes: {}",
            ADDRESSES_GUARD,
            bucket.us_block(),
            bucket.intl_block()
        );

        self.llm.generate(&prompt).await
    }

    async fn key_officers(&self, company: &str) -> Result<String> {
        let record = self.company_record(company).await?;
        let raw = record
            .get("directors")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let officers = harvest_officers(&raw);
        if officers.is_empty() {
            info!(
                "No registry officers for {}, falling back to model knowledge",
                company
            );
            return self.llm.generate(&officers_fallback_prompt(company)).await;
        }

        let prompt = format!(
            "{}\n### Sample (format ONLY – do not repeat wording):\n{}\n\n\
             ### Write the paragraph for the following officers:\n{}",
            officers_guard(company),
            OFFICERS_SAMPLE,
            bullet_lines(&officers)
        );

        self.llm.generate(&prompt).await
    }

    async fn key_shareholders(&self, company: &str) -> Result<String> {
        if company.is_empty() {
            return Ok("Please provide a company name or ticker symbol.".to_string());
        }

        let ticker = match self.resolver.resolve(company).await {
            TickerResolution::Listed(ticker) => ticker,
            TickerResolution::Private | TickerResolution::Unavailable => {
                return Ok(format!("🔎 {}: company isn’t publicly listed.", company));
            }
        };

        let rows = match self.finance.holdings_summary(&ticker).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                info!("Holdings reply for {} held no rows", ticker);
                return Ok(no_holdings_message(&ticker));
            }
            Err(e) => {
                warn!("Holdings fetch failed for {}: {}", ticker, e);
                return Ok(no_holdings_message(&ticker));
            }
        };

        let current = &rows[0];
        let previous = rows.iter().find(|r| r.date == PREVIOUS_QUARTER_END);
        let bullets = holdings_bullets(current, previous);

        let prompt = format!(
            "{}\n\n### Data:\n{}",
            SHAREHOLDERS_GUARD,
            bullet_lines(&bullets)
        );

        self.llm.generate(&prompt).await
    }
}

//
// ================= Section text helpers =================
//

/// Fixed-wording executive summary; no generation involved.
fn executive_summary(company: &str) -> String {
    let company = company.to_uppercase();
    format!(
        "**Executive Summary**\n\
         A deep dive was completed for {company} to review its relationships and \
         identify foreign linkages. Using several data sources and open-source \
         intelligence, a relationship summary has been compiled for {company}’s \
         key officers, shareholders, addresses, controversies and financial \
         indicators, with the following key takeaways."
    )
}

fn no_holdings_message(ticker: &str) -> String {
    format!(
        "⚠️  No 13-F data available for **{}** (possible IPO or thin coverage).",
        ticker
    )
}

fn apology(company: &str, err: &ProfileError) -> String {
    format!(
        "Sorry, I couldn’t fetch data for “{}”.\n\n**Error:** {}\n\n```traceback\n{:?}\n```",
        company, err, err
    )
}

/// Bulletise the current snapshot (with quarter-on-quarter parentheticals
/// where a previous row exists) for the LLM.
fn holdings_bullets(
    current: &HoldingsSnapshot,
    previous: Option<&HoldingsSnapshot>,
) -> Vec<String> {
    let mut institutions = format!(
        "Reporting institutions: {}",
        fmt_amount(current.investors_holding)
    );
    if let Some(previous) = previous {
        institutions.push_str(&format!(
            " (was {} last quarter)",
            fmt_amount(previous.investors_holding)
        ));
    }

    vec![
        format!("Quarter end date: {}", current.date),
        institutions,
        format!(
            "13-F shares reported: {}",
            fmt_amount(current.number_of_13f_shares)
        ),
        format!(
            "Market value of holdings: ${}",
            fmt_amount(current.total_invested)
        ),
        format!(
            "Ownership percentage: {} %",
            fmt_ratio(current.ownership_percent)
        ),
        format!("New positions: {}", fmt_amount(current.new_positions)),
        format!(
            "Positions increased: {}",
            fmt_amount(current.increased_positions)
        ),
        format!(
            "Positions reduced: {}",
            fmt_amount(current.reduced_positions)
        ),
        format!(
            "Positions closed: {}",
            fmt_amount(current.closed_positions)
        ),
        format!("Put / call ratio: {}", fmt_ratio(current.put_call_ratio)),
    ]
}
