//! Client-side collection filters for the admin screens
//!
//! Admin screens fetch whole collections and filter in memory. The filter
//! semantics are fixed: case-insensitive substring match across an entity's
//! named search fields, exact-match status/role filters, and date-range
//! filters. Collection sizes are assumed small (tens to low hundreds).

use chrono::{DateTime, Utc};

use shared::{ActivityLog, Alert, DateRange, Detection, Farm, FarmRequest, PestInfo, Role, User};

/// An entity searchable by the admin text box
pub trait Searchable {
    /// The fields the substring search runs over.
    fn search_fields(&self) -> Vec<&str>;
}

/// Case-insensitive substring match over the entity's search fields.
/// An empty or whitespace query matches everything.
pub fn matches_search<T: Searchable>(item: &T, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Retain items whose search fields contain the query.
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches_search(*item, query))
        .collect()
}

/// Retain items whose status equals the wanted one exactly.
///
/// Generic over the status type since detections, farm requests, and farms
/// each carry their own enum.
pub fn by_status<'a, T, S: PartialEq>(
    items: &'a [T],
    wanted: S,
    status: impl Fn(&T) -> S,
) -> Vec<&'a T> {
    items.iter().filter(|item| status(item) == wanted).collect()
}

/// Retain users with exactly this role. `super_admin` does not match an
/// `admin` filter.
pub fn by_role(users: &[User], role: Role) -> Vec<&User> {
    by_status(users, role, |user| user.role)
}

/// Retain items whose timestamp falls inside the range (inclusive).
pub fn in_date_range<'a, T>(
    items: &'a [T],
    range: &DateRange,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| range.contains(timestamp(item).date_naive()))
        .collect()
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.username.as_str()];
        if let Some(email) = &self.email {
            fields.push(email.as_str());
        }
        fields
    }
}

impl Searchable for Farm {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.crop_type.as_str(),
            self.user_name.as_str(),
        ]
    }
}

impl Searchable for FarmRequest {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.crop_type.as_str()]
    }
}

impl Searchable for Detection {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.pest_name.as_str(), self.crop_type.as_str()]
    }
}

impl Searchable for PestInfo {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.crop_affected.as_str()];
        if let Some(scientific) = &self.scientific_name {
            fields.push(scientific.as_str());
        }
        fields
    }
}

impl Searchable for Alert {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }
}

impl Searchable for ActivityLog {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.user_name.as_str(), self.action.as_str()]
    }
}
