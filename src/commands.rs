//! Command layer: one method per user-facing command.
//!
//! Each command reads the active profile, issues its API calls one after the
//! other, and only writes to the output once every call has succeeded.

use log::{debug, info};
use std::collections::HashSet;
use std::io::{BufRead, Write};

use crate::clock::Clock;
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::format::{self, Entry};
use crate::oauth::{authorize_url, OAuthSigner};
use crate::rcfile::{Credentials, RcFile};
use crate::twitter::direct_messages::{self, Mailbox};
use crate::twitter::following::{self, Graph};
use crate::twitter::geo::{self, Coordinates};
use crate::twitter::tweets::{self, Timeline};
use crate::twitter::users::{self, Lookup};
use crate::twitter::{DirectMessage, Status, TwitterClient, User};

/// Web host for profile pages opened by `open`.
pub const PROFILE_URL_BASE: &str = "https://twitter.com";

/// Runs commands against the API, reading prompts from `R` and writing to `W`.
pub struct App<R, W> {
    settings: Settings,
    rcfile: RcFile,
    clock: Box<dyn Clock>,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> App<R, W> {
    /// Loads the credential file named in `settings`.
    ///
    /// An unreadable file does not stop the app from starting: commands that
    /// need credentials report it, while `authorize` replaces it.
    pub fn new(settings: Settings, clock: Box<dyn Clock>, input: R, out: W) -> Self {
        let rcfile = RcFile::load_or_empty(&settings.profile_path);
        App {
            settings,
            rcfile,
            clock,
            input,
            out,
        }
    }

    pub fn rcfile(&self) -> &RcFile {
        &self.rcfile
    }

    /// Consumes the app, returning its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    fn credentials(&self) -> Result<&Credentials> {
        self.rcfile.require_active()
    }

    fn client(&self) -> Result<TwitterClient> {
        let credentials = self.credentials()?;
        debug!("Using profile @{}", credentials.username);
        Ok(TwitterClient::new(
            &self.settings.api_url,
            OAuthSigner::from_credentials(credentials),
        ))
    }

    /// Screen name of the active profile.
    fn me(&self) -> Result<String> {
        Ok(self.credentials()?.username.clone())
    }

    fn print_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn print_statuses(&mut self, statuses: &[Status]) -> Result<()> {
        let entries = statuses
            .iter()
            .map(Entry::from_status)
            .collect::<Result<Vec<_>>>()?;
        let lines = format::entry_lines(&entries, self.clock.now());
        self.print_lines(&lines)
    }

    fn print_messages(&mut self, messages: &[DirectMessage], mailbox: Mailbox) -> Result<()> {
        let entries: Vec<Entry<'_>> = messages
            .iter()
            .map(|m| match mailbox {
                Mailbox::Received => Entry::from_sender(m),
                Mailbox::Sent => Entry::from_recipient(m),
            })
            .collect();
        let lines = format::entry_lines(&entries, self.clock.now());
        self.print_lines(&lines)
    }

    fn print_users(&mut self, users: &[User]) -> Result<()> {
        let names: Vec<&str> = users.iter().map(|u| u.screen_name.as_str()).collect();
        let lines = format::columns(&names, self.settings.terminal_width);
        self.print_lines(&lines)
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.out, "{}", message)?;
        self.out.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }

    /// Opens `url` in a browser unless this is a dry run.
    fn launch(&self, url: &str) -> Result<()> {
        if self.settings.dry_run {
            info!("Dry run: not opening {}", url);
            return Ok(());
        }
        info!("Opening {}", url);
        open::that(url)?;
        Ok(())
    }

    async fn coordinates(&self, client: &TwitterClient) -> Result<Option<Coordinates>> {
        if !self.settings.location {
            return Ok(None);
        }
        let coordinates = geo::locate(
            client.http(),
            &self.settings.ip_lookup_url,
            &self.settings.geo_lookup_url,
        )
        .await?;
        Ok(Some(coordinates))
    }

    /// Lists stored profiles and marks the default one.
    pub fn accounts(&mut self) -> Result<()> {
        self.rcfile.ensure_readable()?;
        let default = self
            .rcfile
            .default_profile()
            .map(|(name, key)| (name.to_string(), key.to_string()));
        let mut lines = Vec::new();
        for (name, keys) in self.rcfile.profiles() {
            lines.push(name.to_string());
            for key in keys {
                let is_default = default
                    .as_ref()
                    .is_some_and(|(n, k)| n.as_str() == name && k.as_str() == key);
                if is_default {
                    lines.push(format!("  {} (default)", key));
                } else {
                    lines.push(format!("  {}", key));
                }
            }
        }
        self.print_lines(&lines)
    }

    /// Runs the PIN flow and stores the resulting access token as the default profile.
    pub async fn authorize(&mut self, consumer_key: &str, consumer_secret: &str) -> Result<()> {
        if consumer_key.is_empty() || consumer_secret.is_empty() {
            return Err(CliError::Usage(
                "authorize requires --consumer-key and --consumer-secret".to_string(),
            ));
        }
        let consumer = OAuthSigner::consumer(consumer_key, consumer_secret);
        let client = TwitterClient::new(&self.settings.api_url, consumer.clone());

        let request_token = client.request_token(&consumer).await?;
        let url = authorize_url(client.api_url(), &request_token.oauth_token)?;

        self.prompt("Press [Enter] to open the Twitter app authorization page. ")?;
        self.launch(&url)?;
        let pin = self.prompt("Paste in the supplied PIN: ")?;
        if pin.is_empty() {
            return Err(CliError::Usage("no PIN entered".to_string()));
        }

        let access = client.access_token(&consumer, &request_token, &pin).await?;
        let authorized = TwitterClient::new(
            &self.settings.api_url,
            consumer.with_token(&access.oauth_token, &access.oauth_token_secret),
        );
        let user = users::verify_credentials(&authorized).await?;

        self.rcfile.upsert(Credentials {
            username: user.screen_name.clone(),
            consumer_key: consumer_key.to_string(),
            consumer_secret: consumer_secret.to_string(),
            token: access.oauth_token,
            secret: access.oauth_token_secret,
        });
        self.rcfile.save()?;
        writeln!(self.out, "Authorization successful.")?;
        Ok(())
    }

    pub async fn block(&mut self, screen_name: &str) -> Result<()> {
        let client = self.client()?;
        let user = following::block(&client, screen_name).await?;
        let me = self.me()?;
        writeln!(self.out, "@{} blocked @{}.", me, user.screen_name)?;
        Ok(())
    }

    pub async fn direct_messages(&mut self) -> Result<()> {
        let client = self.client()?;
        let messages = direct_messages::fetch_direct_messages(&client, Mailbox::Received).await?;
        self.print_messages(&messages, Mailbox::Received)
    }

    pub async fn direct_messages_sent(&mut self) -> Result<()> {
        let client = self.client()?;
        let messages = direct_messages::fetch_direct_messages(&client, Mailbox::Sent).await?;
        self.print_messages(&messages, Mailbox::Sent)
    }

    pub async fn dm(&mut self, screen_name: &str, text: &str) -> Result<()> {
        let client = self.client()?;
        let message = direct_messages::send_direct_message(&client, screen_name, text).await?;
        let me = self.me()?;
        writeln!(
            self.out,
            "Direct Message sent from @{} to @{} ({} ago).",
            me,
            message.recipient_screen_name,
            format::relative_time(message.created_at, self.clock.now())
        )?;
        Ok(())
    }

    pub async fn favorite(&mut self, status_id: &str) -> Result<()> {
        let client = self.client()?;
        let status = tweets::favorite(&client, status_id).await?;
        let me = self.me()?;
        writeln!(
            self.out,
            "@{} favorited @{}'s status: \"{}\"",
            me,
            status.author()?,
            status.text
        )?;
        Ok(())
    }

    pub async fn favorites(&mut self) -> Result<()> {
        self.timeline_of(Timeline::Favorites).await
    }

    /// Follows every named user, one request per user.
    pub async fn follow(&mut self, screen_names: &[String]) -> Result<()> {
        if screen_names.is_empty() {
            return Err(CliError::Usage("follow USER [USER...]".to_string()));
        }
        let client = self.client()?;
        for name in screen_names {
            following::follow(&client, name).await?;
        }
        let me = self.me()?;
        writeln!(
            self.out,
            "@{} is now following {} more {}.",
            me,
            screen_names.len(),
            if screen_names.len() == 1 { "user" } else { "users" }
        )?;
        Ok(())
    }

    /// Users the account follows.
    pub async fn followings(&mut self) -> Result<()> {
        let client = self.client()?;
        let ids = following::fetch_ids(&client, Graph::Friends).await?;
        self.lookup_and_print(&client, &ids).await
    }

    /// Users following the account.
    pub async fn followers(&mut self) -> Result<()> {
        let client = self.client()?;
        let ids = following::fetch_ids(&client, Graph::Followers).await?;
        self.lookup_and_print(&client, &ids).await
    }

    /// Users who follow the account back.
    pub async fn friends(&mut self) -> Result<()> {
        let client = self.client()?;
        let friend_ids = following::fetch_ids(&client, Graph::Friends).await?;
        let follower_ids: HashSet<u64> = following::fetch_ids(&client, Graph::Followers)
            .await?
            .into_iter()
            .collect();
        let mutual: Vec<u64> = friend_ids
            .into_iter()
            .filter(|id| follower_ids.contains(id))
            .collect();
        self.lookup_and_print(&client, &mutual).await
    }

    /// Users the account follows who do not follow back.
    pub async fn leaders(&mut self) -> Result<()> {
        let client = self.client()?;
        let friend_ids = following::fetch_ids(&client, Graph::Friends).await?;
        let follower_ids: HashSet<u64> = following::fetch_ids(&client, Graph::Followers)
            .await?
            .into_iter()
            .collect();
        let leaders: Vec<u64> = friend_ids
            .into_iter()
            .filter(|id| !follower_ids.contains(id))
            .collect();
        self.lookup_and_print(&client, &leaders).await
    }

    async fn lookup_and_print(&mut self, client: &TwitterClient, ids: &[u64]) -> Result<()> {
        if ids.is_empty() {
            debug!("No ids to look up");
            return Ok(());
        }
        let users = users::lookup_users(client, Lookup::Ids(ids)).await?;
        self.print_users(&users)
    }

    pub async fn members(&mut self, owner: &str, slug: &str) -> Result<()> {
        let client = self.client()?;
        let members = users::list_members(&client, owner, slug).await?;
        self.print_users(&members)
    }

    pub async fn mentions(&mut self) -> Result<()> {
        self.timeline_of(Timeline::Mentions).await
    }

    /// Opens a user's profile page in the browser.
    pub fn open(&mut self, screen_name: &str) -> Result<()> {
        let url = format!("{}/{}", PROFILE_URL_BASE, screen_name.trim_start_matches('@'));
        self.launch(&url)
    }

    /// Replies to a status, addressing its author.
    ///
    /// The status is fetched with `trim_user=true`, so this relies on the API
    /// still including `user.screen_name`. A trimmed author with only an id
    /// fails as [`CliError::MalformedResponse`] before anything is posted.
    pub async fn reply(&mut self, status_id: &str, text: &str) -> Result<()> {
        let client = self.client()?;
        let original = tweets::show_status(&client, status_id).await?;
        let author = original.author()?.to_string();
        let location = self.coordinates(&client).await?;
        let reply = tweets::update_status(
            &client,
            &format!("@{} {}", author, text),
            Some(status_id),
            location.as_ref(),
        )
        .await?;
        let me = self.me()?;
        writeln!(
            self.out,
            "Reply created by @{} to @{} ({} ago).",
            me,
            author,
            format::relative_time(reply.created_at, self.clock.now())
        )?;
        Ok(())
    }

    pub async fn report_spam(&mut self, screen_name: &str) -> Result<()> {
        let client = self.client()?;
        let user = following::report_spam(&client, screen_name).await?;
        let me = self.me()?;
        writeln!(self.out, "@{} reported @{}.", me, user.screen_name)?;
        Ok(())
    }

    pub async fn retweet(&mut self, status_id: &str) -> Result<()> {
        let client = self.client()?;
        let retweet = tweets::retweet(&client, status_id).await?;
        let original = retweet.original();
        let me = self.me()?;
        writeln!(
            self.out,
            "@{} retweeted @{}'s status: \"{}\"",
            me,
            original.author()?,
            original.text
        )?;
        Ok(())
    }

    /// Retweets by the account, or by `screen_name` when given.
    pub async fn retweets(&mut self, screen_name: Option<&str>) -> Result<()> {
        let timeline = match screen_name {
            Some(name) => Timeline::RetweetedByUser(name),
            None => Timeline::RetweetedByMe,
        };
        self.timeline_of(timeline).await
    }

    /// Posts a status, with coordinates when location is enabled.
    pub async fn status(&mut self, text: &str) -> Result<()> {
        let client = self.client()?;
        let location = self.coordinates(&client).await?;
        let status = tweets::update_status(&client, text, None, location.as_ref()).await?;
        let me = self.me()?;
        writeln!(
            self.out,
            "Tweet created by @{} ({} ago).",
            me,
            format::relative_time(status.created_at, self.clock.now())
        )?;
        Ok(())
    }

    pub async fn suggest(&mut self) -> Result<()> {
        let client = self.client()?;
        let suggestions = users::recommendations(&client).await?;
        self.print_users(&suggestions)
    }

    /// Home timeline, or `screen_name`'s statuses when given.
    pub async fn timeline(&mut self, screen_name: Option<&str>) -> Result<()> {
        let timeline = match screen_name {
            Some(name) => Timeline::User(name),
            None => Timeline::Home,
        };
        self.timeline_of(timeline).await
    }

    async fn timeline_of(&mut self, timeline: Timeline<'_>) -> Result<()> {
        let client = self.client()?;
        let statuses = tweets::fetch_timeline(&client, timeline).await?;
        self.print_statuses(&statuses)
    }

    /// Unfollows every named user, one request per user.
    pub async fn unfollow(&mut self, screen_names: &[String]) -> Result<()> {
        if screen_names.is_empty() {
            return Err(CliError::Usage("unfollow USER [USER...]".to_string()));
        }
        let client = self.client()?;
        for name in screen_names {
            following::unfollow(&client, name).await?;
        }
        let me = self.me()?;
        writeln!(
            self.out,
            "@{} is no longer following {}.",
            me,
            format::users_count(screen_names.len())
        )?;
        Ok(())
    }

    pub async fn users(&mut self, screen_names: &[String]) -> Result<()> {
        if screen_names.is_empty() {
            return Err(CliError::Usage("users USER [USER...]".to_string()));
        }
        let client = self.client()?;
        let found = users::lookup_users(&client, Lookup::ScreenNames(screen_names)).await?;
        self.print_users(&found)
    }

    pub fn version(&mut self) -> Result<()> {
        writeln!(self.out, "{}", env!("CARGO_PKG_VERSION"))?;
        Ok(())
    }

    pub async fn whois(&mut self, screen_name: &str) -> Result<()> {
        let client = self.client()?;
        let user = users::show_user(&client, screen_name).await?;
        let lines = format::whois(&user);
        self.print_lines(&lines)
    }
}
