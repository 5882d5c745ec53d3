use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use bountyboard_client::{
    api::{FeedQuery, PostId, PostSource, SortKey, SubredditId},
    load_thread, Applied, FeedController, FeedPage, PageLink, SubredditDirectory,
};
use bountyboard_mock_server::{Fixture, MockServer};

mod http;
use http::HttpPostSource;

const EXCERPT_LEN: usize = 150;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base URL of the API server
    #[structopt(short, long, env = "BOUNTYBOARD_HOST")]
    host: Option<String>,

    /// Browse a JSON fixture instead of a live server
    #[structopt(long, conflicts_with = "host")]
    fixture: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List one page of posts
    Posts {
        /// Only show posts whose title or body contains this
        #[structopt(short, long, default_value = "")]
        search: String,

        /// Subreddit id or name
        #[structopt(short = "r", long)]
        subreddit: Option<String>,

        /// One of date, upvotes, comments
        #[structopt(long, default_value = "date")]
        sort: SortKey,

        #[structopt(short, long, default_value = "1", allow_hyphen_values = true)]
        page: i64,
    },

    /// List the subreddits posts can be filtered on
    Subreddits,

    /// Show a post and its comments
    Thread {
        post: i64,
    },
}

type Source = dyn PostSource + Send + Sync;

fn source(opt: &Opt) -> anyhow::Result<Arc<Source>> {
    match (&opt.host, &opt.fixture) {
        (_, Some(path)) => {
            let fixture = Fixture::load(path)?;
            tracing::info!(
                posts = fixture.posts.len(),
                comments = fixture.comments.len(),
                "browsing fixture"
            );
            Ok(Arc::new(MockServer::from_fixture(fixture)))
        }
        (Some(host), None) => Ok(Arc::new(HttpPostSource::new(host.clone()))),
        (None, None) => Err(anyhow!(
            "either --host, BOUNTYBOARD_HOST or --fixture must be set"
        )),
    }
}

async fn resolve_subreddit(source: &Source, arg: &str) -> anyhow::Result<SubredditId> {
    if let Ok(id) = arg.parse() {
        return Ok(SubredditId(id));
    }
    let dir = SubredditDirectory::load(source).await;
    dir.by_name(arg)
        .map(|s| s.id)
        .with_context(|| format!("no subreddit named {:?}", arg))
}

fn print_pagination(page: &FeedPage) {
    if !page.shows_pagination() {
        return;
    }
    let links = page
        .page_links()
        .into_iter()
        .map(|l| match l {
            PageLink::Page(n) if n == page.current_page => format!("[{n}]"),
            PageLink::Page(n) => n.to_string(),
            PageLink::Ellipsis => String::from("..."),
        })
        .collect::<Vec<_>>();
    println!(
        "{} {} {}",
        if page.has_previous() { "<" } else { " " },
        links.join(" "),
        if page.has_next() { ">" } else { " " },
    );
}

async fn list_posts(
    source: Arc<Source>,
    search: String,
    subreddit: Option<String>,
    sort: SortKey,
    page: i64,
) -> anyhow::Result<()> {
    let subreddit = match subreddit {
        None => None,
        Some(s) => Some(resolve_subreddit(&*source, &s).await?),
    };

    let query = FeedQuery::default()
        .with_search_term(search)
        .with_subreddit(subreddit)
        .with_sort_key(sort)
        .with_page(u64::try_from(page).unwrap_or(0));
    let mut feed = FeedController::new(source);
    let req = feed.set_query(query);
    let res = feed.fetch(req).await;
    tracing::debug!(?res, "fetched posts");

    if let Some(err) = feed.error() {
        println!("{}", err.message);
    }
    if let Applied::Failed = res {
        return Err(anyhow!("failed fetching posts"));
    }

    let page = match feed.page() {
        Some(page) => page,
        None => return Ok(()),
    };
    if page.items.is_empty() {
        println!("No posts found");
    }
    for post in page.items.iter() {
        println!(
            "#{} r/{} [{} upvotes, {} comments] {}",
            post.id.0, post.subreddit_name, post.upvotes, post.comments_count, post.title,
        );
        let excerpt = post.excerpt(EXCERPT_LEN);
        if !excerpt.is_empty() {
            println!("    {excerpt}");
        }
    }
    println!(
        "page {} of {} ({} posts)",
        page.current_page, page.total_pages, page.total_count
    );
    print_pagination(page);
    Ok(())
}

async fn show_thread(source: &Source, post: PostId) -> anyhow::Result<()> {
    let thread = load_thread(source, post)
        .await
        .with_context(|| format!("loading thread of post {}", post.0))?;
    let p = &thread.post;
    println!("{} (r/{}, by {})", p.summary.title, p.summary.subreddit_name, p.author);
    if let Some(body) = &p.summary.body {
        println!("{body}");
    }
    if let Some(url) = &p.post_url {
        println!("{url}");
    }
    println!();
    println!("Comments ({})", thread.comment_count());
    if thread.comments.is_empty() {
        println!("No comments yet.");
    }
    for (depth, c) in thread.comments.iter() {
        let indent = "    ".repeat(depth);
        println!("{indent}{} [{}]: {}", c.author, c.upvotes, c.body);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let source = source(&opt)?;

    match opt.cmd {
        Command::Posts {
            search,
            subreddit,
            sort,
            page,
        } => list_posts(source, search, subreddit, sort, page).await,
        Command::Subreddits => {
            let subreddits = source
                .fetch_subreddits()
                .await
                .context("fetching subreddits")?;
            for s in subreddits {
                println!("{}\tr/{}", s.id, s.name);
            }
            Ok(())
        }
        Command::Thread { post } => show_thread(&*source, PostId(post)).await,
    }
}
