//! Prompt builders for the sentiment, risk and peer-discovery requests.
//!
//! Every builder is a pure function of its inputs. The risk and peer
//! prompts pin down an output format that `analysis::parser` relies on.

use std::fmt::Write;

use crate::clients::finnhub::{CompanyProfile, NewsArticle, Quote};

/// Upper bound on articles quoted in a single prompt.
pub const MAX_NEWS_ITEMS: usize = 5;

fn or_na<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn company_label(profile: &CompanyProfile, ticker: &str) -> String {
    match &profile.name {
        Some(name) => format!("{name} ({ticker})"),
        None => ticker.to_string(),
    }
}

fn profile_block(profile: &CompanyProfile) -> String {
    format!(
        "Industry: {}\nMarket Cap: {}\nExchange: {}\nCountry: {}\n",
        or_na(&profile.finnhub_industry),
        or_na(&profile.market_capitalization),
        or_na(&profile.exchange),
        or_na(&profile.country),
    )
}

fn news_block(news: &[NewsArticle]) -> String {
    if news.is_empty() {
        return "No recent news articles are available.\n".to_string();
    }

    let mut block = String::from("Recent news:\n");
    for (i, article) in news.iter().take(MAX_NEWS_ITEMS).enumerate() {
        let _ = writeln!(block, "{}. {}", i + 1, article.headline.trim());
        let summary = article.summary.trim();
        if !summary.is_empty() {
            let _ = writeln!(block, "   {summary}");
        }
    }
    block
}

pub fn sentiment_prompt(ticker: &str, profile: &CompanyProfile, news: &[NewsArticle]) -> String {
    format!(
        "Analyze the market sentiment for {} based on the following information:\n\
         {}\n\
         {}\n\
         Provide a concise analysis of the company's current market position and potential future outlook.",
        company_label(profile, ticker),
        profile_block(profile),
        news_block(news),
    )
}

pub fn risk_prompt(
    ticker: &str,
    profile: &CompanyProfile,
    quote: Option<&Quote>,
    news: &[NewsArticle],
) -> String {
    let quote_block = match quote {
        Some(q) => format!(
            "Current Price: {}\nPrevious Close: {}\nDay High: {}\nDay Low: {}\n",
            or_na(&q.current),
            or_na(&q.previous_close),
            or_na(&q.high),
            or_na(&q.low),
        ),
        None => "Current quote data is unavailable.\n".to_string(),
    };

    format!(
        "Assess the investment risk of {} based on the following information:\n\
         {}{}\n\
         {}\n\
         Rate the risk on a scale from 0 (lowest risk) to 100 (highest risk).\n\
         Respond with exactly two lines and nothing else:\n\
         RISK_SCORE: <integer from 0 to 100>\n\
         EXPLANATION: <one paragraph explaining the score>",
        company_label(profile, ticker),
        profile_block(profile),
        quote_block,
        news_block(news),
    )
}

pub fn peers_prompt(ticker: &str, profile: &CompanyProfile) -> String {
    format!(
        "List the main publicly traded competitors of {} (industry: {}).\n\
         Return ONLY a JSON array of objects, each with a \"ticker\" string and a \"name\" string, \
         for example: [{{\"ticker\": \"MSFT\", \"name\": \"Microsoft\"}}].\n\
         Do not include any explanation, markdown or text outside the JSON array.",
        company_label(profile, ticker),
        or_na(&profile.finnhub_industry),
    )
}
