use anyhow::Context;
use bountyboard_api::{
    CommentId, CommentRecord, PostDetail, PostId, PostSummary, Subreddit, SubredditId, Time,
};
use bountyboard_mock_server::Fixture;
use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};

const SUBREDDITS: &[&str] = &["forhire", "slavelabour", "hiring", "jobbit", "designjobs"];

const NUM_POSTS: usize = 120;
const POST_BODY_WORDS: usize = 60;
const MAX_UPVOTES: u64 = 500;

const MAX_COMMENTS_PER_POST: usize = 12;
const COMMENT_WORDS: usize = 25;

// Posts are spread over the last MAX_AGE_DAYS days
const MAX_AGE_DAYS: i64 = 90;

fn gen_date(rng: &mut impl Rng, after: Time) -> Time {
    let span = (Utc::now() - after).num_minutes().max(1);
    after + Duration::minutes(rng.gen_range(0..span))
}

fn gen_username(rng: &mut impl Rng) -> String {
    let word = lipsum::lipsum_words(1)
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    format!("{}{}", word, rng.gen_range(1..1000))
}

fn main() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();

    // Generate subreddits
    let subreddits = SUBREDDITS
        .iter()
        .enumerate()
        .map(|(i, name)| Subreddit {
            id: SubredditId(i as i64 + 1),
            name: String::from(*name),
            description: Some(lipsum::lipsum_words(10)),
        })
        .collect::<Vec<_>>();

    // Generate posts and their comments
    let mut posts = Vec::with_capacity(NUM_POSTS);
    let mut comments = Vec::new();
    let start = Utc::now() - Duration::days(MAX_AGE_DAYS);
    for i in 0..NUM_POSTS {
        let id = PostId(i as i64 + 1);
        let subreddit = subreddits
            .choose(&mut rng)
            .context("there is always at least one subreddit")?;
        let date = gen_date(&mut rng, start);

        // Answers pick a random earlier comment of the same post as parent
        let num_comments = rng.gen_range(0..=MAX_COMMENTS_PER_POST);
        let mut thread: Vec<CommentRecord> = Vec::with_capacity(num_comments);
        for _ in 0..num_comments {
            let parent = match rng.gen_bool(0.6) {
                true => thread.choose(&mut rng).map(|c| c.id),
                false => None,
            };
            let after = parent
                .and_then(|p| thread.iter().find(|c| c.id == p))
                .and_then(|c| c.submitted_at)
                .unwrap_or(date);
            thread.push(CommentRecord {
                id: CommentId((comments.len() + thread.len()) as i64 + 1),
                post: Some(id),
                parent_id: parent,
                author: gen_username(&mut rng),
                body: lipsum::lipsum_words(rng.gen_range(1..=COMMENT_WORDS)),
                upvotes: rng.gen_range(0..MAX_UPVOTES / 10),
                submitted_at: Some(gen_date(&mut rng, after)),
            });
        }

        posts.push(PostDetail {
            summary: PostSummary {
                id,
                title: lipsum::lipsum_title(),
                body: match rng.gen_bool(0.9) {
                    true => Some(lipsum::lipsum_words(POST_BODY_WORDS)),
                    false => None,
                },
                subreddit: Some(subreddit.id),
                subreddit_name: subreddit.name.clone(),
                upvotes: rng.gen_range(0..MAX_UPVOTES),
                comments_count: thread.len() as u64,
                submission_date: Some(date),
            },
            author: gen_username(&mut rng),
            post_url: Some(format!(
                "https://www.reddit.com/r/{}/comments/{}",
                subreddit.name, id.0
            )),
        });
        comments.extend(thread);
    }

    let fixture = Fixture {
        subreddits,
        posts,
        comments,
    };
    let out = serde_json::to_string_pretty(&fixture).context("serializing fixture")?;
    println!("{}", out);
    Ok(())
}
