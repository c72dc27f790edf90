//! In-memory repositories for testing.
//!
//! [`MemoryStore`] implements all three repository traits over one
//! shared, mutex-guarded state so the cross-entity rules (cascade
//! deletes, rating recomputation, the one-review-per-author
//! constraint) behave exactly like the SQL backend.

use crate::error::{DomainError, Result};
use crate::ids::{CategoryId, CommentId, GenreId, ReviewId, TitleId, UserId};
use crate::model::{Category, Comment, Genre, Publication, Review, SlugRef, Title, User};
use crate::rating;
use crate::repo::{
    CatalogRepository, NewComment, NewReview, NewSlugEntry, NewTitle, Page, ReviewPatch,
    ReviewRepository, TitleFilter, TitlePatch, UserRepository,
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// Title row as stored; category and genres are kept as slugs and
/// resolved on read.
#[derive(Debug, Clone)]
struct StoredTitle {
    id: TitleId,
    name: String,
    year: i32,
    description: Option<String>,
    category: Option<String>,
    genres: Vec<String>,
    rating: Option<f64>,
}

#[derive(Debug, Default)]
struct State {
    categories: Vec<Category>,
    genres: Vec<Genre>,
    titles: Vec<StoredTitle>,
    reviews: Vec<Review>,
    comments: Vec<Comment>,
    users: Vec<User>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve_title(&self, stored: &StoredTitle) -> Title {
        Title {
            id: stored.id,
            name: stored.name.clone(),
            year: stored.year,
            description: stored.description.clone(),
            category: stored
                .category
                .as_ref()
                .and_then(|slug| self.categories.iter().find(|c| c.slug_ref.slug == *slug))
                .cloned(),
            genres: stored
                .genres
                .iter()
                .filter_map(|slug| self.genres.iter().find(|g| g.slug_ref.slug == *slug))
                .cloned()
                .collect(),
            rating: stored.rating,
        }
    }

    fn recompute_rating(&mut self, title_id: TitleId) {
        let scores: Vec<i16> = self
            .reviews
            .iter()
            .filter(|r| r.title_id == title_id)
            .map(|r| r.score)
            .collect();
        if let Some(title) = self.titles.iter_mut().find(|t| t.id == title_id) {
            title.rating = rating::average(&scores);
        }
    }

    /// Remove a user's reviews and comments, keeping ratings honest.
    fn remove_publications_of(&mut self, user_id: UserId) {
        let removed_reviews: Vec<ReviewId> = self
            .reviews
            .iter()
            .filter(|r| r.publication.author_id == user_id)
            .map(|r| r.id)
            .collect();
        let affected: Vec<TitleId> = self
            .reviews
            .iter()
            .filter(|r| r.publication.author_id == user_id)
            .map(|r| r.title_id)
            .collect();
        self.reviews
            .retain(|r| r.publication.author_id != user_id);
        self.comments.retain(|c| {
            c.publication.author_id != user_id && !removed_reviews.contains(&c.review_id)
        });
        for title_id in affected {
            self.recompute_rating(title_id);
        }
    }
}

fn page<T: Clone>(items: Vec<T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Shared in-memory store implementing every repository trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| DomainError::Database("mock store lock poisoned".to_string()))
    }
}

impl CatalogRepository for MemoryStore {
    fn list_categories(
        &self,
        search: Option<&str>,
        pg: Page,
    ) -> impl Future<Output = Result<Vec<Category>>> + Send {
        let store = self.clone();
        let search = search.map(str::to_string);
        async move {
            let state = store.lock()?;
            let mut items: Vec<Category> = state
                .categories
                .iter()
                .filter(|c| {
                    search
                        .as_deref()
                        .is_none_or(|s| contains_ci(&c.slug_ref.name, s))
                })
                .cloned()
                .collect();
            items.sort_by(|a, b| a.slug_ref.name.cmp(&b.slug_ref.name));
            Ok(page(items, pg))
        }
    }

    fn create_category(
        &self,
        entry: &NewSlugEntry,
    ) -> impl Future<Output = Result<Category>> + Send {
        let store = self.clone();
        let entry = entry.clone();
        async move {
            let mut state = store.lock()?;
            if state
                .categories
                .iter()
                .any(|c| c.slug_ref.name == entry.name || c.slug_ref.slug == entry.slug)
            {
                return Err(DomainError::Conflict(
                    "category name or slug already exists".to_string(),
                ));
            }
            let category = Category {
                id: CategoryId(state.next_id()),
                slug_ref: SlugRef {
                    name: entry.name,
                    slug: entry.slug,
                },
            };
            state.categories.push(category.clone());
            Ok(category)
        }
    }

    fn get_category(&self, slug: &str) -> impl Future<Output = Result<Category>> + Send {
        let store = self.clone();
        let slug = slug.to_string();
        async move {
            let state = store.lock()?;
            state
                .categories
                .iter()
                .find(|c| c.slug_ref.slug == slug)
                .cloned()
                .ok_or(DomainError::not_found("category"))
        }
    }

    fn delete_category(&self, slug: &str) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        let slug = slug.to_string();
        async move {
            let mut state = store.lock()?;
            let before = state.categories.len();
            state.categories.retain(|c| c.slug_ref.slug != slug);
            if state.categories.len() == before {
                return Err(DomainError::not_found("category"));
            }
            // Titles survive their category: null the reference.
            for title in &mut state.titles {
                if title.category.as_deref() == Some(slug.as_str()) {
                    title.category = None;
                }
            }
            Ok(())
        }
    }

    fn list_genres(
        &self,
        search: Option<&str>,
        pg: Page,
    ) -> impl Future<Output = Result<Vec<Genre>>> + Send {
        let store = self.clone();
        let search = search.map(str::to_string);
        async move {
            let state = store.lock()?;
            let mut items: Vec<Genre> = state
                .genres
                .iter()
                .filter(|g| {
                    search
                        .as_deref()
                        .is_none_or(|s| contains_ci(&g.slug_ref.name, s))
                })
                .cloned()
                .collect();
            items.sort_by(|a, b| a.slug_ref.name.cmp(&b.slug_ref.name));
            Ok(page(items, pg))
        }
    }

    fn create_genre(&self, entry: &NewSlugEntry) -> impl Future<Output = Result<Genre>> + Send {
        let store = self.clone();
        let entry = entry.clone();
        async move {
            let mut state = store.lock()?;
            if state
                .genres
                .iter()
                .any(|g| g.slug_ref.name == entry.name || g.slug_ref.slug == entry.slug)
            {
                return Err(DomainError::Conflict(
                    "genre name or slug already exists".to_string(),
                ));
            }
            let genre = Genre {
                id: GenreId(state.next_id()),
                slug_ref: SlugRef {
                    name: entry.name,
                    slug: entry.slug,
                },
            };
            state.genres.push(genre.clone());
            Ok(genre)
        }
    }

    fn get_genre(&self, slug: &str) -> impl Future<Output = Result<Genre>> + Send {
        let store = self.clone();
        let slug = slug.to_string();
        async move {
            let state = store.lock()?;
            state
                .genres
                .iter()
                .find(|g| g.slug_ref.slug == slug)
                .cloned()
                .ok_or(DomainError::not_found("genre"))
        }
    }

    fn delete_genre(&self, slug: &str) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        let slug = slug.to_string();
        async move {
            let mut state = store.lock()?;
            let before = state.genres.len();
            state.genres.retain(|g| g.slug_ref.slug != slug);
            if state.genres.len() == before {
                return Err(DomainError::not_found("genre"));
            }
            for title in &mut state.titles {
                title.genres.retain(|g| g != &slug);
            }
            Ok(())
        }
    }

    fn create_title(&self, new: &NewTitle) -> impl Future<Output = Result<Title>> + Send {
        let store = self.clone();
        let new = new.clone();
        async move {
            let mut state = store.lock()?;
            if let Some(slug) = &new.category {
                if !state.categories.iter().any(|c| c.slug_ref.slug == *slug) {
                    return Err(DomainError::validation(
                        "category",
                        format!("unknown category slug {slug}"),
                    ));
                }
            }
            for slug in &new.genres {
                if !state.genres.iter().any(|g| g.slug_ref.slug == *slug) {
                    return Err(DomainError::validation(
                        "genre",
                        format!("unknown genre slug {slug}"),
                    ));
                }
            }
            let stored = StoredTitle {
                id: TitleId(state.next_id()),
                name: new.name,
                year: new.year,
                description: new.description,
                category: new.category,
                genres: new.genres,
                rating: None,
            };
            state.titles.push(stored.clone());
            Ok(state.resolve_title(&stored))
        }
    }

    fn get_title(&self, id: TitleId) -> impl Future<Output = Result<Title>> + Send {
        let store = self.clone();
        async move {
            let state = store.lock()?;
            state
                .titles
                .iter()
                .find(|t| t.id == id)
                .map(|t| state.resolve_title(t))
                .ok_or(DomainError::not_found("title"))
        }
    }

    fn list_titles(
        &self,
        filter: &TitleFilter,
        pg: Page,
    ) -> impl Future<Output = Result<Vec<Title>>> + Send {
        let store = self.clone();
        let filter = filter.clone();
        async move {
            let state = store.lock()?;
            let mut items: Vec<Title> = state
                .titles
                .iter()
                .filter(|t| {
                    filter
                        .category
                        .as_deref()
                        .is_none_or(|c| t.category.as_deref() == Some(c))
                        && filter
                            .genre
                            .as_deref()
                            .is_none_or(|g| t.genres.iter().any(|slug| slug == g))
                        && filter.year.is_none_or(|y| t.year == y)
                        && filter
                            .name
                            .as_deref()
                            .is_none_or(|n| contains_ci(&t.name, n))
                })
                .map(|t| state.resolve_title(t))
                .collect();
            items.sort_by_key(|t| t.id);
            Ok(page(items, pg))
        }
    }

    fn update_title(
        &self,
        id: TitleId,
        patch: &TitlePatch,
    ) -> impl Future<Output = Result<Title>> + Send {
        let store = self.clone();
        let patch = patch.clone();
        async move {
            let mut state = store.lock()?;
            if let Some(slug) = &patch.category {
                if !state.categories.iter().any(|c| c.slug_ref.slug == *slug) {
                    return Err(DomainError::validation(
                        "category",
                        format!("unknown category slug {slug}"),
                    ));
                }
            }
            if let Some(genres) = &patch.genres {
                for slug in genres {
                    if !state.genres.iter().any(|g| g.slug_ref.slug == *slug) {
                        return Err(DomainError::validation(
                            "genre",
                            format!("unknown genre slug {slug}"),
                        ));
                    }
                }
            }
            let Some(title) = state.titles.iter_mut().find(|t| t.id == id) else {
                return Err(DomainError::not_found("title"));
            };
            if let Some(name) = patch.name {
                title.name = name;
            }
            if let Some(year) = patch.year {
                title.year = year;
            }
            if let Some(description) = patch.description {
                title.description = Some(description);
            }
            if let Some(category) = patch.category {
                title.category = Some(category);
            }
            if let Some(genres) = patch.genres {
                title.genres = genres;
            }
            let stored = title.clone();
            Ok(state.resolve_title(&stored))
        }
    }

    fn delete_title(&self, id: TitleId) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        async move {
            let mut state = store.lock()?;
            let before = state.titles.len();
            state.titles.retain(|t| t.id != id);
            if state.titles.len() == before {
                return Err(DomainError::not_found("title"));
            }
            // Cascade: reviews of the title, then their comments.
            let removed: Vec<ReviewId> = state
                .reviews
                .iter()
                .filter(|r| r.title_id == id)
                .map(|r| r.id)
                .collect();
            state.reviews.retain(|r| r.title_id != id);
            state.comments.retain(|c| !removed.contains(&c.review_id));
            Ok(())
        }
    }
}

impl ReviewRepository for MemoryStore {
    fn list_reviews(
        &self,
        title_id: TitleId,
        pg: Page,
    ) -> impl Future<Output = Result<Vec<Review>>> + Send {
        let store = self.clone();
        async move {
            let state = store.lock()?;
            let mut items: Vec<Review> = state
                .reviews
                .iter()
                .filter(|r| r.title_id == title_id)
                .cloned()
                .collect();
            items.sort_by_key(|r| r.publication.pub_date);
            Ok(page(items, pg))
        }
    }

    fn get_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
    ) -> impl Future<Output = Result<Review>> + Send {
        let store = self.clone();
        async move {
            let state = store.lock()?;
            state
                .reviews
                .iter()
                .find(|r| r.id == id && r.title_id == title_id)
                .cloned()
                .ok_or(DomainError::not_found("review"))
        }
    }

    fn create_review(&self, new: &NewReview) -> impl Future<Output = Result<Review>> + Send {
        let store = self.clone();
        let new = new.clone();
        async move {
            let mut state = store.lock()?;
            if !state.titles.iter().any(|t| t.id == new.title_id) {
                return Err(DomainError::not_found("title"));
            }
            if state
                .reviews
                .iter()
                .any(|r| r.title_id == new.title_id && r.publication.author_id == new.author_id)
            {
                return Err(DomainError::Conflict(
                    "you have already reviewed this title".to_string(),
                ));
            }
            let review = Review {
                id: ReviewId(state.next_id()),
                title_id: new.title_id,
                score: new.score,
                publication: Publication {
                    author_id: new.author_id,
                    author: new.author,
                    text: new.text,
                    pub_date: Utc::now(),
                },
            };
            state.reviews.push(review.clone());
            state.recompute_rating(new.title_id);
            Ok(review)
        }
    }

    fn update_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
        patch: &ReviewPatch,
    ) -> impl Future<Output = Result<Review>> + Send {
        let store = self.clone();
        let patch = patch.clone();
        async move {
            let mut state = store.lock()?;
            let Some(review) = state
                .reviews
                .iter_mut()
                .find(|r| r.id == id && r.title_id == title_id)
            else {
                return Err(DomainError::not_found("review"));
            };
            if let Some(text) = patch.text {
                review.publication.text = text;
            }
            if let Some(score) = patch.score {
                review.score = score;
            }
            let updated = review.clone();
            state.recompute_rating(title_id);
            Ok(updated)
        }
    }

    fn delete_review(
        &self,
        title_id: TitleId,
        id: ReviewId,
    ) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        async move {
            let mut state = store.lock()?;
            let before = state.reviews.len();
            state
                .reviews
                .retain(|r| !(r.id == id && r.title_id == title_id));
            if state.reviews.len() == before {
                return Err(DomainError::not_found("review"));
            }
            state.comments.retain(|c| c.review_id != id);
            state.recompute_rating(title_id);
            Ok(())
        }
    }

    fn list_comments(
        &self,
        review_id: ReviewId,
        pg: Page,
    ) -> impl Future<Output = Result<Vec<Comment>>> + Send {
        let store = self.clone();
        async move {
            let state = store.lock()?;
            let mut items: Vec<Comment> = state
                .comments
                .iter()
                .filter(|c| c.review_id == review_id)
                .cloned()
                .collect();
            items.sort_by_key(|c| c.publication.pub_date);
            Ok(page(items, pg))
        }
    }

    fn get_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> impl Future<Output = Result<Comment>> + Send {
        let store = self.clone();
        async move {
            let state = store.lock()?;
            state
                .comments
                .iter()
                .find(|c| c.id == id && c.review_id == review_id)
                .cloned()
                .ok_or(DomainError::not_found("comment"))
        }
    }

    fn create_comment(&self, new: &NewComment) -> impl Future<Output = Result<Comment>> + Send {
        let store = self.clone();
        let new = new.clone();
        async move {
            let mut state = store.lock()?;
            if !state.reviews.iter().any(|r| r.id == new.review_id) {
                return Err(DomainError::not_found("review"));
            }
            let comment = Comment {
                id: CommentId(state.next_id()),
                review_id: new.review_id,
                publication: Publication {
                    author_id: new.author_id,
                    author: new.author,
                    text: new.text,
                    pub_date: Utc::now(),
                },
            };
            state.comments.push(comment.clone());
            Ok(comment)
        }
    }

    fn update_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
        text: &str,
    ) -> impl Future<Output = Result<Comment>> + Send {
        let store = self.clone();
        let text = text.to_string();
        async move {
            let mut state = store.lock()?;
            let Some(comment) = state
                .comments
                .iter_mut()
                .find(|c| c.id == id && c.review_id == review_id)
            else {
                return Err(DomainError::not_found("comment"));
            };
            comment.publication.text = text;
            Ok(comment.clone())
        }
    }

    fn delete_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        async move {
            let mut state = store.lock()?;
            let before = state.comments.len();
            state
                .comments
                .retain(|c| !(c.id == id && c.review_id == review_id));
            if state.comments.len() == before {
                return Err(DomainError::not_found("comment"));
            }
            Ok(())
        }
    }
}

impl UserRepository for MemoryStore {
    fn list_users(
        &self,
        search: Option<&str>,
        pg: Page,
    ) -> impl Future<Output = Result<Vec<User>>> + Send {
        let store = self.clone();
        let search = search.map(str::to_string);
        async move {
            let state = store.lock()?;
            let mut items: Vec<User> = state
                .users
                .iter()
                .filter(|u| {
                    search
                        .as_deref()
                        .is_none_or(|s| contains_ci(&u.username, s))
                })
                .cloned()
                .collect();
            items.sort_by(|a, b| a.username.cmp(&b.username));
            Ok(page(items, pg))
        }
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send {
        let store = self.clone();
        let username = username.to_string();
        async move {
            let state = store.lock()?;
            Ok(state
                .users
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }
    }

    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Option<User>>> + Send {
        let store = self.clone();
        let email = email.to_string();
        async move {
            let state = store.lock()?;
            Ok(state.users.iter().find(|u| u.email == email).cloned())
        }
    }

    fn create_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send {
        let store = self.clone();
        let user = user.clone();
        async move {
            let mut state = store.lock()?;
            if state.users.iter().any(|u| u.username == user.username) {
                return Err(DomainError::Conflict("username already taken".to_string()));
            }
            if state.users.iter().any(|u| u.email == user.email) {
                return Err(DomainError::Conflict("email already taken".to_string()));
            }
            state.users.push(user.clone());
            Ok(user)
        }
    }

    fn update_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send {
        let store = self.clone();
        let user = user.clone();
        async move {
            let mut state = store.lock()?;
            if state
                .users
                .iter()
                .any(|u| u.id != user.id && u.username == user.username)
            {
                return Err(DomainError::Conflict("username already taken".to_string()));
            }
            if state
                .users
                .iter()
                .any(|u| u.id != user.id && u.email == user.email)
            {
                return Err(DomainError::Conflict("email already taken".to_string()));
            }
            let Some(existing) = state.users.iter_mut().find(|u| u.id == user.id) else {
                return Err(DomainError::not_found("user"));
            };
            *existing = user.clone();
            Ok(user)
        }
    }

    fn delete_user(&self, username: &str) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        let username = username.to_string();
        async move {
            let mut state = store.lock()?;
            let Some(user) = state.users.iter().find(|u| u.username == username) else {
                return Err(DomainError::not_found("user"));
            };
            let user_id = user.id;
            state.users.retain(|u| u.id != user_id);
            state.remove_publications_of(user_id);
            Ok(())
        }
    }

    fn set_confirmation_code(
        &self,
        id: UserId,
        code_hash: &str,
        issued_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        let code_hash = code_hash.to_string();
        async move {
            let mut state = store.lock()?;
            let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
                return Err(DomainError::not_found("user"));
            };
            user.confirmation_code_hash = Some(code_hash);
            user.code_issued_at = Some(issued_at);
            Ok(())
        }
    }

    fn clear_confirmation_code(&self, id: UserId) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        async move {
            let mut state = store.lock()?;
            let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
                return Err(DomainError::not_found("user"));
            };
            user.confirmation_code_hash = None;
            user.code_issued_at = None;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn author(name: &str) -> (UserId, String) {
        (UserId::new(), name.to_string())
    }

    async fn store_with_title() -> (MemoryStore, TitleId) {
        let store = MemoryStore::new();
        let title = store
            .create_title(&NewTitle {
                name: "Dune".to_string(),
                year: 1965,
                description: None,
                category: None,
                genres: vec![],
            })
            .await
            .unwrap();
        (store, title.id)
    }

    #[tokio::test]
    async fn test_rating_follows_review_lifecycle() {
        let (store, title_id) = store_with_title().await;
        let (alice, alice_name) = author("alice");
        let (bob, bob_name) = author("bob");

        assert_eq!(store.get_title(title_id).await.unwrap().rating, None);

        let first = store
            .create_review(&NewReview {
                title_id,
                author_id: alice,
                author: alice_name,
                text: "great".to_string(),
                score: 8,
            })
            .await
            .unwrap();
        assert_eq!(store.get_title(title_id).await.unwrap().rating, Some(8.0));

        store
            .create_review(&NewReview {
                title_id,
                author_id: bob,
                author: bob_name,
                text: "fine".to_string(),
                score: 6,
            })
            .await
            .unwrap();
        assert_eq!(store.get_title(title_id).await.unwrap().rating, Some(7.0));

        store.delete_review(title_id, first.id).await.unwrap();
        assert_eq!(store.get_title(title_id).await.unwrap().rating, Some(6.0));
    }

    #[tokio::test]
    async fn test_duplicate_review_is_a_conflict() {
        let (store, title_id) = store_with_title().await;
        let (alice, name) = author("alice");
        let new = NewReview {
            title_id,
            author_id: alice,
            author: name,
            text: "once".to_string(),
            score: 5,
        };
        store.create_review(&new).await.unwrap();
        let err = store.create_review(&new).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_title_delete_cascades_to_reviews_and_comments() {
        let (store, title_id) = store_with_title().await;
        let (alice, name) = author("alice");
        let review = store
            .create_review(&NewReview {
                title_id,
                author_id: alice,
                author: name.clone(),
                text: "r".to_string(),
                score: 3,
            })
            .await
            .unwrap();
        store
            .create_comment(&NewComment {
                review_id: review.id,
                author_id: alice,
                author: name,
                text: "c".to_string(),
            })
            .await
            .unwrap();

        store.delete_title(title_id).await.unwrap();
        assert!(matches!(
            store.get_review(title_id, review.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(
            store
                .list_comments(review.id, Page::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_category_delete_nulls_title_reference() {
        let store = MemoryStore::new();
        store
            .create_category(&NewSlugEntry {
                name: "Books".to_string(),
                slug: "books".to_string(),
            })
            .await
            .unwrap();
        let title = store
            .create_title(&NewTitle {
                name: "Dune".to_string(),
                year: 1965,
                description: None,
                category: Some("books".to_string()),
                genres: vec![],
            })
            .await
            .unwrap();
        assert!(title.category.is_some());

        store.delete_category("books").await.unwrap();
        let title = store.get_title(title.id).await.unwrap();
        assert!(title.category.is_none());
    }
}
