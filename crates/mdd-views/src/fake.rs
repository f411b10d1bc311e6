//! In-memory [`ResourceApi`] for view tests.

use std::{
  collections::{HashMap, HashSet},
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::{TimeZone, Utc};
use mdd_core::{
  CommentId, Error, PostId, Result, SubjectId, UserId,
  api::ResourceApi,
  post::{Comment, NewComment, NewPost, Post, PostQuery, SortOrder},
  principal::{Principal, ProfileUpdate, Session, User},
  subject::Subject,
};
use mdd_session::{MemoryPersistence, SessionStore};
use parking_lot::Mutex;
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeApi {
  pub posts:            Mutex<Vec<Post>>,
  pub comments:         Mutex<Vec<Comment>>,
  pub subjects:         Mutex<Vec<Subject>>,
  pub users:            Mutex<HashMap<UserId, User>>,
  pub failing_users:    Mutex<HashSet<UserId>>,
  pub failing_subjects: AtomicBool,
  pub failing_follows:  Mutex<HashSet<SubjectId>>,
  /// Lookups of these users wait for `release` after signalling `started`.
  pub held_users:       Mutex<HashSet<UserId>>,
  /// Same for the subject list and for (un)subscribing to these subjects.
  pub held_subjects:    AtomicBool,
  pub held_follows:     Mutex<HashSet<SubjectId>>,
  pub started:          Notify,
  pub release:          Notify,
  pub user_lookups:     AtomicUsize,
  pub subject_lookups:  AtomicUsize,
  pub comment_calls:    AtomicUsize,
  pub last_query:       Mutex<Option<PostQuery>>,
  pub saved_posts:      Mutex<Vec<(Option<PostId>, NewPost)>>,
}

impl FakeApi {
  pub fn lookups(&self) -> usize { self.user_lookups.load(Ordering::SeqCst) }

  /// Signal `started`, then wait for `release`.
  async fn hold(&self) {
    self.started.notify_one();
    self.release.notified().await;
  }

  pub fn with_user(self, id: i64, name: &str) -> Self {
    self.users.lock().insert(UserId(id), user(id, name));
    self
  }
}

pub fn user(id: i64, name: &str) -> User {
  User {
    id:           UserId(id),
    user_name:    name.into(),
    email:        format!("{name}@b.com"),
    subscription: Vec::new(),
  }
}

pub fn post(id: i64, author: i64, subject: i64) -> Post {
  Post {
    id:          PostId(id),
    title:       format!("post {id}"),
    description: "body".into(),
    date:        Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap(),
    subject_id:  SubjectId(subject),
    author_id:   UserId(author),
  }
}

pub fn subject(id: i64, title: &str) -> Subject {
  Subject {
    id:             SubjectId(id),
    title:          title.into(),
    description:    String::new(),
    date:           None,
    subscriber_ids: Vec::new(),
  }
}

pub fn comment(id: i64, author: i64) -> Comment {
  Comment {
    id:          CommentId(id),
    post_id:     Some(PostId(1)),
    author_id:   UserId(author),
    description: format!("comment {id}"),
    date:        Some(Utc.with_ymd_and_hms(2024, 6, 15, 9, 3, 0).unwrap()),
  }
}

/// A store already holding alice's session.
pub async fn signed_in() -> SessionStore {
  let store = SessionStore::new(Arc::new(MemoryPersistence::new()));
  let session = Session {
    principal: Principal {
      id:           UserId(1),
      display_name: "alice".into(),
      email:        "alice@b.com".into(),
    },
    token:     "T".into(),
  };
  store.set_session(store.ticket(), session).await.unwrap();
  store
}

impl ResourceApi for FakeApi {
  async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>> {
    let mut posts = self.posts.lock().clone();
    posts.sort_by_key(|p| p.date);
    if query.order == SortOrder::Desc {
      posts.reverse();
    }
    *self.last_query.lock() = Some(query);
    Ok(posts)
  }

  async fn get_post(&self, id: PostId) -> Result<Post> {
    self
      .posts
      .lock()
      .iter()
      .find(|p| p.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("post {id}")))
  }

  async fn create_post(&self, post: NewPost) -> Result<Post> {
    self.saved_posts.lock().push((None, post.clone()));
    Ok(Post {
      id:          PostId(100),
      title:       post.title,
      description: post.description,
      date:        Utc::now(),
      subject_id:  post.subject_id,
      author_id:   post.author_id,
    })
  }

  async fn update_post(&self, id: PostId, post: NewPost) -> Result<Post> {
    self.saved_posts.lock().push((Some(id), post.clone()));
    Ok(Post {
      id,
      title: post.title,
      description: post.description,
      date: Utc::now(),
      subject_id: post.subject_id,
      author_id: post.author_id,
    })
  }

  async fn list_comments(&self, _post: PostId) -> Result<Vec<Comment>> {
    self.comment_calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.comments.lock().clone())
  }

  async fn add_comment(&self, post: PostId, comment: NewComment) -> Result<Comment> {
    let mut comments = self.comments.lock();
    let created = Comment {
      id:          CommentId(comments.len() as i64 + 1),
      post_id:     Some(post),
      author_id:   comment.author_id,
      description: comment.description,
      date:        Some(comment.date),
    };
    comments.push(created.clone());
    Ok(created)
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    self.subject_lookups.fetch_add(1, Ordering::SeqCst);
    if self.held_subjects.load(Ordering::SeqCst) {
      self.hold().await;
    }
    if self.failing_subjects.load(Ordering::SeqCst) {
      return Err(Error::Network("connection reset".into()));
    }
    Ok(self.subjects.lock().clone())
  }

  async fn subscribe(&self, user: UserId, subject: SubjectId) -> Result<()> {
    let held = self.held_follows.lock().contains(&subject);
    if held {
      self.hold().await;
    }
    if self.failing_follows.lock().contains(&subject) {
      return Err(Error::Server("subscription failed".into()));
    }
    let followed = self.subjects.lock().iter().find(|s| s.id == subject).cloned();
    if let Some(followed) = followed
      && let Some(u) = self.users.lock().get_mut(&user)
    {
      u.subscription.push(followed);
    }
    Ok(())
  }

  async fn unsubscribe(&self, user: UserId, subject: SubjectId) -> Result<()> {
    if self.failing_follows.lock().contains(&subject) {
      return Err(Error::Server("subscription failed".into()));
    }
    if let Some(u) = self.users.lock().get_mut(&user) {
      u.subscription.retain(|s| s.id != subject);
    }
    Ok(())
  }

  async fn get_user(&self, id: UserId) -> Result<User> {
    self.user_lookups.fetch_add(1, Ordering::SeqCst);
    let held = self.held_users.lock().contains(&id);
    if held {
      self.hold().await;
    }
    if self.failing_users.lock().contains(&id) {
      return Err(Error::Server("lookup failed".into()));
    }
    self
      .users
      .lock()
      .get(&id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("user {id}")))
  }

  async fn update_user(&self, id: UserId, update: ProfileUpdate) -> Result<User> {
    let mut users = self.users.lock();
    let u = users
      .get_mut(&id)
      .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
    u.user_name = update.user_name;
    u.email = update.email;
    Ok(u.clone())
  }
}
