#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

/// One scripted reply. The last reply of a route repeats once the script runs out.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("status {status}"),
        }
    }
}

/// Local stand-in for the ranking site. Routes are keyed by path plus query.
pub struct AnimeStub {
    pub base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AnimeStub {
    pub fn spawn(routes: Vec<(String, Vec<Reply>)>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start anime stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let routes: HashMap<String, Vec<Reply>> = routes.into_iter().collect();
        let hits = Arc::new(Mutex::new(HashMap::<String, usize>::new()));
        let server_hits = Arc::clone(&hits);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let served = {
                    let mut hits = server_hits.lock().expect("lock hits");
                    let count = hits.entry(url.clone()).or_default();
                    *count += 1;
                    *count
                };

                let reply = routes
                    .get(&url)
                    .and_then(|script| script.get(served - 1).or_else(|| script.last()))
                    .cloned()
                    .unwrap_or_else(|| Reply::status(404));

                let mut response =
                    tiny_http::Response::from_string(reply.body).with_status_code(reply.status);
                if reply.status == 200 {
                    let header = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"text/html; charset=utf-8"[..],
                    )
                    .expect("build header");
                    response = response.with_header(header);
                }
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            hits,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .expect("lock hits")
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

impl Drop for AnimeStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub struct Entry {
    pub rank: u32,
    pub id: u32,
    pub title: &'static str,
    pub score: &'static str,
    pub users: &'static str,
}

pub fn listing_page(entries: &[Entry]) -> String {
    let rows = entries
        .iter()
        .map(|entry| {
            format!(
                r#"<tr class="ranking-list">
  <td class="rank ac"><span class="lightLink top-anime-rank-text">{rank}</span></td>
  <td class="title al va-t word-break">
    <div class="detail"><h3 class="hoverinfo_trigger fl-l fs14 fw-b anime_ranking_h3"><a href="/anime/{id}/x">{title}</a></h3></div>
  </td>
  <td class="score ac fs14"><div class="js-top-ranking-score-col di-ib al"><span class="text on score-label">{score}</span></div>
    <div class="information">scored by {users} users</div></td>
</tr>"#,
                rank = entry.rank,
                id = entry.id,
                title = entry.title,
                score = entry.score,
                users = entry.users,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!doctype html>
<html><head><title>Top Anime</title></head>
<body><table class="top-ranking-table">
<tr class="table-header"><td>Rank</td><td>Title</td><td>Score</td></tr>
{rows}
</table></body></html>"#
    )
}

pub struct Detail {
    pub title: &'static str,
    pub kind: &'static str,
    pub episodes: &'static str,
    pub genres: &'static [&'static str],
    pub watching: &'static str,
    pub completed: &'static str,
    pub on_hold: &'static str,
    pub dropped: &'static str,
    pub plan_to_watch: &'static str,
}

pub fn detail_page(detail: &Detail) -> String {
    let genres = detail
        .genres
        .iter()
        .map(|genre| format!(r#"<span itemprop="genre">{genre}</span>"#))
        .collect::<String>();

    format!(
        r#"<!doctype html>
<html><head><title>{title}</title></head>
<body>
  <h1 class="title-name">{title}</h1>
  <div class="leftside">
    <div class="spaceit_pad"><span class="dark_text">Type:</span> <a href="/topanime.php?type=x">{kind}</a></div>
    <div class="spaceit_pad"><span class="dark_text">Episodes:</span> {episodes}</div>
    <div class="spaceit_pad"><span class="dark_text">Aired:</span> Apr 5, 2009 to Jul 4, 2010</div>
    <div class="spaceit_pad"><span class="dark_text">Premiered:</span> Spring 2009</div>
    <div class="spaceit_pad"><span class="dark_text">Season:</span> <a href="/anime/season/2009/spring">Spring 2009</a></div>
    <div class="spaceit_pad"><span class="dark_text">Source:</span> Manga</div>
    <div class="spaceit_pad"><span class="dark_text">Genres:</span> {genres}</div>
    <div class="spaceit_pad"><span class="dark_text">Duration:</span> 24 min. per ep.</div>
  </div>
  <div class="stats">
    <div class="spaceit_pad"><span class="dark_text">Watching:</span> {watching}</div>
    <div class="spaceit_pad"><span class="dark_text">Completed:</span> {completed}</div>
    <div class="spaceit_pad"><span class="dark_text">On-Hold:</span> {on_hold}</div>
    <div class="spaceit_pad"><span class="dark_text">Dropped:</span> {dropped}</div>
    <div class="spaceit_pad"><span class="dark_text">Plan to Watch:</span> {plan_to_watch}</div>
  </div>
</body></html>"#,
        title = detail.title,
        kind = detail.kind,
        episodes = detail.episodes,
        watching = detail.watching,
        completed = detail.completed,
        on_hold = detail.on_hold,
        dropped = detail.dropped,
        plan_to_watch = detail.plan_to_watch,
    )
}
