//! Composition root: builds the session, clients and orchestrator once and
//! runs one command against them.

use std::{
  io::{self, BufRead, Write},
  sync::Arc,
};

use anyhow::{Context as _, Result, bail};
use mdd_client::{ApiClient, AuthClient, AuthGateway, RequestAuthenticator};
use mdd_core::{
  SubjectId,
  api::SessionPersistence,
  post::SortOrder,
  principal::{ProfileUpdate, Registration},
};
use mdd_session::{MemoryPersistence, Navigation, RouteGuard, SessionStore};
use mdd_store_sqlite::SqlitePersistence;
use mdd_views::{
  DetailState, JoinOrchestrator, PostDetail, PostForm, PostList, ProfileView, SubjectList,
};
use tracing::debug;

use crate::{Command, render, settings::Settings};

pub struct App {
  session:      SessionStore,
  guard:        RouteGuard,
  gateway:      AuthGateway<AuthClient>,
  orchestrator: JoinOrchestrator<ApiClient>,
}

impl App {
  pub async fn build(settings: &Settings, ephemeral: bool) -> Result<Self> {
    let persistence: Arc<dyn SessionPersistence> = if ephemeral {
      Arc::new(MemoryPersistence::new())
    } else {
      let path = settings.session_path();
      let store = SqlitePersistence::open(&path)
        .await
        .with_context(|| format!("failed to open session store at {path:?}"))?;
      Arc::new(store)
    };

    let session = SessionStore::restore(persistence)
      .await
      .context("failed to restore session")?;
    debug!(signed_in = session.is_authenticated(), base_url = %settings.base_url, "starting");

    let http = RequestAuthenticator::new(&settings.client_config(), session.clone())?;
    Ok(Self {
      guard: RouteGuard::new(session.clone()),
      gateway: AuthGateway::new(AuthClient::new(http.clone()), session.clone()),
      orchestrator: JoinOrchestrator::new(ApiClient::new(http), session.clone()),
      session,
    })
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    if let Navigation::Redirect { from, to } = self.guard.check(command.route()) {
      bail!("{from} needs a session; log in first (see {to}, `mdd login <email>`)");
    }

    match command {
      Command::Login { email, password } => {
        let password = password_or_prompt(password)?;
        let session = self.gateway.login(&email, &password).await?;
        println!("Logged in as {}", render::principal(&session.principal));
      }

      Command::Register {
        email,
        user_name,
        password,
      } => {
        let password = password_or_prompt(password)?;
        let principal = self
          .gateway
          .register(Registration {
            email,
            user_name,
            password,
          })
          .await?;
        println!("Registered {}", render::principal(&principal));
        println!("Log in with `mdd login {}`", principal.email);
      }

      Command::Logout => {
        self.gateway.logout().await;
        println!("Logged out");
      }

      Command::Whoami => match self.session.principal() {
        Some(p) => println!("{}", render::principal(&p)),
        None => println!("Not logged in"),
      },

      Command::Posts { asc } => {
        let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
        let list = PostList::new(self.orchestrator.clone(), order);
        println!("{}", render::posts(&list.load().await?));
      }

      Command::Post { id } => {
        let detail = PostDetail::new(self.orchestrator.clone(), id);
        detail.load().await?;
        if let DetailState::Ready(view) = detail.state() {
          println!("{}", render::detail(&view));
        }
      }

      Command::Comment { post, text } => {
        let detail = PostDetail::new(self.orchestrator.clone(), post);
        detail.load().await?;
        let comment = detail.add_comment(&text).await?;
        println!("{}", render::comment(&comment));
      }

      Command::NewPost {
        subject,
        title,
        description,
      } => {
        let form = PostForm::new(self.orchestrator.clone(), None);
        let post = form.submit(&title, &description, subject).await?;
        println!("Published post #{}", post.id);
      }

      Command::EditPost {
        id,
        subject,
        title,
        description,
      } => {
        let form = PostForm::new(self.orchestrator.clone(), Some(id));
        let Some(current) = form.existing().await? else {
          bail!("post #{id} not found");
        };
        let post = form
          .submit(
            title.as_deref().unwrap_or(&current.title),
            description.as_deref().unwrap_or(&current.description),
            subject.unwrap_or(current.subject_id),
          )
          .await?;
        println!("Updated post #{}", post.id);
      }

      Command::Subjects => {
        let list = SubjectList::new(self.orchestrator.clone());
        println!("{}", render::subjects(&list.load().await?));
      }

      Command::Follow { id } => self.set_followed(id, true).await?,
      Command::Unfollow { id } => self.set_followed(id, false).await?,

      Command::Profile => {
        let profile = ProfileView::new(self.orchestrator.clone());
        println!("{}", render::profile(&profile.load().await?));
      }

      Command::UpdateProfile {
        user_name,
        email,
        password,
      } => {
        let Some(current) = self.session.principal() else {
          bail!("not logged in");
        };
        let password = password_or_prompt(password)?;
        let profile = ProfileView::new(self.orchestrator.clone());
        let user = profile
          .update(ProfileUpdate {
            user_name: user_name.unwrap_or(current.display_name),
            email: email.unwrap_or(current.email),
            password,
          })
          .await?;
        println!("Profile saved: {} <{}>", user.user_name, user.email);
      }
    }
    Ok(())
  }

  async fn set_followed(&self, id: SubjectId, follow: bool) -> Result<()> {
    let list = SubjectList::new(self.orchestrator.clone());
    list.load().await?;
    let view = if follow {
      list.follow(id).await?
    } else {
      list.unfollow(id).await?
    };
    let verb = if view.followed { "Following" } else { "No longer following" };
    println!("{verb} {}", view.subject.title);
    Ok(())
  }
}

/// Use the given password or read one line from stdin.
fn password_or_prompt(password: Option<String>) -> Result<String> {
  if let Some(password) = password {
    return Ok(password);
  }
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("failed to read password")?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
