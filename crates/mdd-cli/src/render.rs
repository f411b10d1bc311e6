//! Plain-text rendering of view models.

use mdd_core::{
  principal::{Principal, User},
  view::{CommentView, PostDetailView, PostView, SubjectView},
};

fn post_line(view: &PostView) -> String {
  format!(
    "#{:<5} {}  {}  by {}",
    view.post.id,
    view.post.date.format("%Y/%m/%d"),
    view.post.title,
    view.author_name
  )
}

pub fn posts(views: &[PostView]) -> String {
  if views.is_empty() {
    return "No posts yet.".to_string();
  }
  views.iter().map(post_line).collect::<Vec<_>>().join("\n")
}

pub fn comment(view: &CommentView) -> String {
  format!("  {} ({}): {}", view.author_name, view.formatted_date, view.comment.description)
}

pub fn detail(view: &PostDetailView) -> String {
  let post = &view.post.post;
  let mut lines = vec![
    post.title.clone(),
    format!(
      "{} · {} · {}",
      view.subject_title,
      view.post.author_name,
      post.date.format("%Y/%m/%d")
    ),
    String::new(),
    post.description.clone(),
    String::new(),
    format!("Comments ({})", view.comments.len()),
  ];
  lines.extend(view.comments.iter().map(comment));
  lines.join("\n")
}

pub fn subjects(views: &[SubjectView]) -> String {
  if views.is_empty() {
    return "No subjects.".to_string();
  }
  views
    .iter()
    .map(|v| {
      let mark = if v.followed { "[x]" } else { "[ ]" };
      format!("{mark} #{:<4} {}  {}", v.subject.id, v.subject.title, v.subject.description)
    })
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn principal(p: &Principal) -> String {
  format!("{} <{}> (#{})", p.display_name, p.email, p.id)
}

pub fn profile(user: &User) -> String {
  let mut lines = vec![
    format!("{} <{}>", user.user_name, user.email),
    String::new(),
    format!("Subscriptions ({})", user.subscription.len()),
  ];
  lines.extend(
    user
      .subscription
      .iter()
      .map(|s| format!("  #{:<4} {}", s.id, s.title)),
  );
  lines.join("\n")
}
