use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use url::Url;

use super::{FetchError, Profile, Publications, page};

/// Rows Scholar returns per page when asked for the maximum.
const PAGE_SIZE: usize = 100;
/// Upper bound on pages requested for one profile.
const MAX_PAGES: usize = 20;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A way of getting a profile out of Scholar.
pub trait Strategy {
    fn name(&self) -> &'static str;
    fn fetch(&self, client: &Client) -> Result<Profile, FetchError>;
}

/// Strategies to try, in order.
///
/// NOTE: Ordering is important here. The first one to succeed wins, so the more complete
/// strategy has to come first.
pub static STRATEGIES: &[&(dyn Strategy + Sync)] = &[&PagedScrape, &SinglePageScrape];

/// HTTP access to one Scholar user's profile pages.
pub struct Client {
    agent: ureq::Agent,
    base: Url,
    user: String,
}

impl Client {
    pub fn new(base: &str, user: &str, timeout: Duration) -> Result<Self, FetchError> {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(timeout.min(Duration::from_secs(5))))
            .timeout_global(Some(timeout))
            .build();
        Ok(Client {
            agent: ureq::Agent::new_with_config(cfg),
            base: Url::parse(base)?,
            user: user.to_string(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn profile_url(&self, extra: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self.base.join("citations")?;
        url.query_pairs_mut()
            .append_pair("user", &self.user)
            .append_pair("hl", "en")
            .extend_pairs(extra);
        Ok(url)
    }

    fn get(&self, url: &Url) -> Result<String, FetchError> {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("fetching {url}"));
        spinner.enable_steady_tick(Duration::from_millis(100));

        debug!(%url, "requesting profile page");
        let res = self
            .agent
            .get(url.as_str())
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en")
            .call()
            .and_then(|res| res.into_body().read_to_string());
        spinner.finish_and_clear();
        Ok(res?)
    }
}

/// Walk every page of the publication table and read both metric columns.
pub struct PagedScrape;

impl Strategy for PagedScrape {
    fn name(&self) -> &'static str {
        "paged"
    }

    fn fetch(&self, client: &Client) -> Result<Profile, FetchError> {
        let size = PAGE_SIZE.to_string();
        let mut header = None;
        let mut rows = Vec::new();

        for n in 0..MAX_PAGES {
            let start = (n * PAGE_SIZE).to_string();
            let url = client.profile_url(&[("cstart", &start), ("pagesize", &size)])?;
            let page = page::parse(&client.get(&url)?);
            let count = page.rows.len();
            debug!(page = n, rows = count, "parsed profile page");

            rows.extend(page.rows.iter().cloned());
            if header.is_none() {
                header = Some(page);
            }
            if count < PAGE_SIZE {
                break;
            }
        }

        let header = header.ok_or_else(|| FetchError::Parse("no pages fetched".into()))?;
        let stats = header.require_stats()?;
        Ok(Profile {
            name: header.name.unwrap_or_default(),
            affiliation: header.affiliation.unwrap_or_default(),
            citedby: stats.citedby,
            citedby5y: stats.citedby5y,
            hindex: stats.hindex,
            hindex5y: stats.hindex5y,
            i10index: stats.i10index,
            i10index5y: stats.i10index5y,
            publications: Publications::positional(
                rows.into_iter().map(|r| r.into_publication(client.base())),
            ),
            ..Profile::empty(&Default::default(), String::new())
        })
    }
}

/// One plain request for the default profile page. Only the all-time column is read; the
/// five-year figures repeat it.
pub struct SinglePageScrape;

impl Strategy for SinglePageScrape {
    fn name(&self) -> &'static str {
        "single-page"
    }

    fn fetch(&self, client: &Client) -> Result<Profile, FetchError> {
        let url = client.profile_url(&[])?;
        let page = page::parse(&client.get(&url)?);
        let stats = page.require_stats()?;
        Ok(Profile {
            name: page.name.unwrap_or_default(),
            affiliation: page.affiliation.unwrap_or_default(),
            citedby: stats.citedby,
            citedby5y: stats.citedby,
            hindex: stats.hindex,
            hindex5y: stats.hindex,
            i10index: stats.i10index,
            i10index5y: stats.i10index,
            publications: Publications::positional(
                page.rows.into_iter().map(|r| r.into_publication(client.base())),
            ),
            ..Profile::empty(&Default::default(), String::new())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_url_carries_user_and_paging() {
        let client = Client::new("https://scholar.google.com", "abc_DEF", Duration::from_secs(1))
            .unwrap();
        let url = client.profile_url(&[("cstart", "100"), ("pagesize", "100")]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://scholar.google.com/citations?user=abc_DEF&hl=en&cstart=100&pagesize=100"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(matches!(
            Client::new("not a url", "x", Duration::from_secs(1)),
            Err(FetchError::Url(_))
        ));
    }

    #[test]
    fn unreachable_host_fails_every_strategy() {
        // Port 9 (discard) is closed on any sane test machine.
        let client = Client::new("http://127.0.0.1:9/", "x", Duration::from_secs(2)).unwrap();
        for strategy in STRATEGIES {
            assert!(strategy.fetch(&client).is_err(), "{} succeeded", strategy.name());
        }
    }

    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STATS: [u64; 6] = [120, 80, 6, 5, 4, 3];

    /// A profile page with the stats table and `rows` publications numbered from `start`.
    fn profile_html(start: usize, rows: usize) -> String {
        let mut lines = vec![
            r#"<div id="gsc_prf_in">Ada Lovelace</div>"#.to_string(),
            r#"<div class="gsc_prf_il">Analytical Society</div>"#.to_string(),
            r#"<table id="gsc_rsb_st">"#.to_string(),
        ];
        lines.extend(STATS.iter().map(|n| format!(r#"<td class="gsc_rsb_std">{n}</td>"#)));
        lines.push("</table><table>".to_string());
        for i in start..start + rows {
            lines.push(format!(
                concat!(
                    r#"<tr class="gsc_a_tr"><td><a href="/citations?view_op=x&amp;p={i}" class="gsc_a_at">Paper {i}</a>"#,
                    r#"<div class="gs_gray">A Lovelace</div><div class="gs_gray">Memoirs</div></td>"#,
                    r#"<td><a class="gsc_a_ac gs_ibl">{i}</a></td>"#,
                    r#"<td><span class="gsc_a_h gsc_a_hc gs_ibl">1843</span></td></tr>"#,
                ),
                i = i
            ));
        }
        lines.push("</table>".to_string());
        lines.join("\n")
    }

    async fn serve_page(server: &MockServer, cstart: &str, body: String, times: u64) {
        Mock::given(method("GET"))
            .and(path("/citations"))
            .and(query_param("user", "abc"))
            .and(query_param("cstart", cstart))
            .and(query_param("pagesize", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(times)
            .mount(server)
            .await;
    }

    async fn run(server: &MockServer, strategy: &'static (dyn Strategy + Sync)) -> Result<Profile, FetchError> {
        let client = Client::new(&server.uri(), "abc", Duration::from_secs(5)).unwrap();
        tokio::task::spawn_blocking(move || strategy.fetch(&client)).await.unwrap()
    }

    #[tokio::test]
    async fn paged_scrape_follows_full_pages() {
        let server = MockServer::start().await;
        serve_page(&server, "0", profile_html(0, PAGE_SIZE), 1).await;
        serve_page(&server, "100", profile_html(100, 3), 1).await;
        serve_page(&server, "200", profile_html(200, 1), 0).await;

        let profile = run(&server, &PagedScrape).await.unwrap();
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.affiliation, "Analytical Society");
        assert_eq!(profile.publications.len(), 103);
        let last = profile.publications.get("pub_102").unwrap();
        assert_eq!(last.bib.title, "Paper 102");
        assert_eq!(last.num_citations, 102);
        assert!(last.pub_url.starts_with(&server.uri()), "{}", last.pub_url);
        assert_eq!(
            [
                profile.citedby,
                profile.citedby5y,
                profile.hindex,
                profile.hindex5y,
                profile.i10index,
                profile.i10index5y,
            ],
            STATS
        );
    }

    #[tokio::test]
    async fn paged_scrape_stops_at_short_page() {
        let server = MockServer::start().await;
        serve_page(&server, "0", profile_html(0, 2), 1).await;
        serve_page(&server, "100", profile_html(100, 2), 0).await;

        let profile = run(&server, &PagedScrape).await.unwrap();
        assert_eq!(profile.publications.len(), 2);
    }

    #[tokio::test]
    async fn single_page_repeats_all_time_figures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/citations"))
            .and(query_param("user", "abc"))
            .and(query_param_is_missing("cstart"))
            .respond_with(ResponseTemplate::new(200).set_body_string(profile_html(0, 4)))
            .expect(1)
            .mount(&server)
            .await;

        let profile = run(&server, &SinglePageScrape).await.unwrap();
        assert_eq!(profile.publications.len(), 4);
        assert_eq!((profile.citedby, profile.citedby5y), (120, 120));
        assert_eq!((profile.hindex, profile.hindex5y), (6, 6));
        assert_eq!((profile.i10index, profile.i10index5y), (4, 4));
    }

    #[tokio::test]
    async fn single_page_runs_when_paged_scrape_fails() {
        let server = MockServer::start().await;
        // The paged request gets a page without the stats table.
        serve_page(&server, "0", "<html><body>Please show you're not a robot</body></html>".into(), 1)
            .await;
        Mock::given(method("GET"))
            .and(path("/citations"))
            .and(query_param_is_missing("cstart"))
            .respond_with(ResponseTemplate::new(200).set_body_string(profile_html(0, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "abc", Duration::from_secs(5)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let identity = crate::scholar::Identity {
            name: "Someone Else".into(),
            affiliation: String::new(),
            email: "ada@example.org".into(),
        };
        let (record, outcome) = tokio::task::spawn_blocking(move || {
            crate::scholar::fetch_or_fallback(
                &client,
                STRATEGIES,
                dir.path(),
                &identity,
                chrono::Utc::now(),
            )
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(outcome, crate::scholar::Outcome::Fetched("single-page"));
        assert_eq!(record["citedby5y"], 120);
        assert_eq!(record["name"], "Ada Lovelace");
        assert_eq!(record["email"], "ada@example.org");
        assert!(!record.contains_key("message"));
    }
}
