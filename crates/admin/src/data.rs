//! Data access collaborators.
//!
//! Entities are plain JSON objects keyed by `id`. Pages reach storage only
//! through [`RepositoryFactory`] and [`Repository`]; [`InMemoryRepository`]
//! backs tests and the CLI.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

/// A stored record.
pub type Entity = serde_json::Map<String, Value>;

/// Errors reported by repositories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
	#[error("search on '{entity}' failed: {reason}")]
	Search { entity: String, reason: String },

	#[error("saving '{entity}' failed: {reason}")]
	Save { entity: String, reason: String },

	#[error("'{entity}' with id '{id}' not found")]
	NotFound { entity: String, id: String },
}

/// Search result: the matching entities plus the total match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityCollection {
	pub entity: String,
	pub items: Vec<Entity>,
	pub total: usize,
}

impl EntityCollection {
	pub fn new(entity: impl Into<String>) -> Self {
		Self {
			entity: entity.into(),
			items: Vec::new(),
			total: 0,
		}
	}

	pub fn first(&self) -> Option<&Entity> {
		self.items.first()
	}

	pub fn add(&mut self, entity: Entity) {
		self.items.push(entity);
		self.total += 1;
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
		self.items.iter()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
	Equals { field: String, value: Value },
}

impl Filter {
	fn matches(&self, entity: &Entity) -> bool {
		match self {
			Self::Equals { field, value } => entity.get(field).unwrap_or(&Value::Null) == value,
		}
	}
}

/// Query description: which associations to load and which filters to apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Criteria {
	associations: Vec<String>,
	filters: Vec<Filter>,
}

impl Criteria {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Filter {
		Filter::Equals {
			field: field.into(),
			value: value.into(),
		}
	}

	pub fn add_association(mut self, name: impl Into<String>) -> Self {
		let name = name.into();
		if !self.associations.contains(&name) {
			self.associations.push(name);
		}
		self
	}

	pub fn add_filter(mut self, filter: Filter) -> Self {
		self.filters.push(filter);
		self
	}

	pub fn associations(&self) -> &[String] {
		&self.associations
	}

	pub fn filters(&self) -> &[Filter] {
		&self.filters
	}

	/// True when every filter accepts `entity`.
	pub fn matches(&self, entity: &Entity) -> bool {
		self.filters.iter().all(|f| f.matches(entity))
	}
}

pub trait Repository: Send + Sync {
	fn entity_name(&self) -> &str;

	fn search(&self, criteria: &Criteria) -> Result<EntityCollection, DataError>;

	/// A new, unsaved entity with a fresh id.
	fn create(&self) -> Entity;

	/// Inserts or replaces the entity with the same id.
	fn save(&self, entity: &Entity) -> Result<(), DataError>;
}

pub trait RepositoryFactory: Send + Sync {
	fn create(&self, entity_name: &str) -> Arc<dyn Repository>;
}

#[derive(Default)]
struct Store {
	rows: Vec<Entity>,
	fail_search: Option<String>,
	fail_save: Option<String>,
}

/// Vector-backed repository.
///
/// Fields named as associations are stripped from search results unless the
/// criteria asks for them.
pub struct InMemoryRepository {
	entity: String,
	associations: Vec<String>,
	store: RwLock<Store>,
}

impl InMemoryRepository {
	pub fn new(entity: impl Into<String>) -> Self {
		Self {
			entity: entity.into(),
			associations: Vec::new(),
			store: RwLock::new(Store::default()),
		}
	}

	pub fn with_associations<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.associations.extend(names.into_iter().map(Into::into));
		self
	}

	/// Stores `entity` directly, bypassing failure injection.
	pub fn seed(&self, entity: Entity) {
		upsert(&mut self.store.write().rows, entity);
	}

	pub fn rows(&self) -> Vec<Entity> {
		self.store.read().rows.clone()
	}

	pub fn get(&self, id: &str) -> Result<Entity, DataError> {
		self.store
			.read()
			.rows
			.iter()
			.find(|row| row.get("id").and_then(Value::as_str) == Some(id))
			.cloned()
			.ok_or_else(|| DataError::NotFound {
				entity: self.entity.clone(),
				id: id.to_string(),
			})
	}

	/// Makes every following search fail with `reason`, or succeed again with `None`.
	pub fn fail_searches(&self, reason: Option<&str>) {
		self.store.write().fail_search = reason.map(str::to_string);
	}

	/// Makes every following save fail with `reason`, or succeed again with `None`.
	pub fn fail_saves(&self, reason: Option<&str>) {
		self.store.write().fail_save = reason.map(str::to_string);
	}
}

fn upsert(rows: &mut Vec<Entity>, entity: Entity) {
	let id = entity.get("id").cloned();
	match rows.iter_mut().find(|row| id.is_some() && row.get("id") == id.as_ref()) {
		Some(row) => *row = entity,
		None => rows.push(entity),
	}
}

impl Repository for InMemoryRepository {
	fn entity_name(&self) -> &str {
		&self.entity
	}

	fn search(&self, criteria: &Criteria) -> Result<EntityCollection, DataError> {
		let store = self.store.read();
		if let Some(reason) = &store.fail_search {
			return Err(DataError::Search {
				entity: self.entity.clone(),
				reason: reason.clone(),
			});
		}

		let mut result = EntityCollection::new(&self.entity);
		for row in store.rows.iter().filter(|row| criteria.matches(row)) {
			let mut row = row.clone();
			for association in &self.associations {
				if !criteria.associations().contains(association) {
					row.remove(association);
				}
			}
			result.add(row);
		}
		tracing::trace!(entity = %self.entity, total = result.total, "In-memory search");
		Ok(result)
	}

	fn create(&self) -> Entity {
		let mut entity = Entity::new();
		entity.insert("id".into(), Value::String(uuid::Uuid::new_v4().simple().to_string()));
		entity
	}

	fn save(&self, entity: &Entity) -> Result<(), DataError> {
		let mut store = self.store.write();
		if let Some(reason) = &store.fail_save {
			return Err(DataError::Save {
				entity: self.entity.clone(),
				reason: reason.clone(),
			});
		}
		if !entity.get("id").is_some_and(Value::is_string) {
			return Err(DataError::Save {
				entity: self.entity.clone(),
				reason: "entity has no id".into(),
			});
		}
		upsert(&mut store.rows, entity.clone());
		Ok(())
	}
}

/// Hands out one shared [`InMemoryRepository`] per entity name.
#[derive(Default)]
pub struct InMemoryRepositoryFactory {
	repositories: Mutex<FxHashMap<String, Arc<InMemoryRepository>>>,
	associations: FxHashMap<String, Vec<String>>,
}

impl InMemoryRepositoryFactory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares association fields for repositories created afterwards.
	pub fn with_associations(mut self, entity: &str, names: &[&str]) -> Self {
		self.associations
			.insert(entity.to_string(), names.iter().map(|n| n.to_string()).collect());
		self
	}

	/// The concrete repository for `entity`, created on first use.
	pub fn repository(&self, entity: &str) -> Arc<InMemoryRepository> {
		let mut repositories = self.repositories.lock();
		Arc::clone(repositories.entry(entity.to_string()).or_insert_with(|| {
			let associations = self.associations.get(entity).cloned().unwrap_or_default();
			Arc::new(InMemoryRepository::new(entity).with_associations(associations))
		}))
	}
}

impl RepositoryFactory for InMemoryRepositoryFactory {
	fn create(&self, entity_name: &str) -> Arc<dyn Repository> {
		self.repository(entity_name)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn entity(value: Value) -> Entity {
		match value {
			Value::Object(map) => map,
			other => panic!("expected object, got {other}"),
		}
	}

	#[test]
	fn search_applies_filters_and_associations() {
		let repo = InMemoryRepository::new("config").with_associations(["fields"]);
		repo.seed(entity(json!({ "id": "a", "lang": "de", "fields": [1] })));
		repo.seed(entity(json!({ "id": "b", "lang": "en", "fields": [2] })));

		let plain = repo.search(&Criteria::new().add_filter(Criteria::equals("lang", "de"))).unwrap();
		assert_eq!(plain.total, 1);
		assert_eq!(plain.first().and_then(|e| e.get("fields")), None);

		let loaded = repo
			.search(
				&Criteria::new()
					.add_association("fields")
					.add_filter(Criteria::equals("lang", "de")),
			)
			.unwrap();
		assert_eq!(loaded.first().and_then(|e| e.get("fields")), Some(&json!([1])));
	}

	#[test]
	fn save_upserts_by_id() {
		let repo = InMemoryRepository::new("config");
		let mut created = repo.create();
		created.insert("v".into(), json!(1));
		repo.save(&created).unwrap();
		created.insert("v".into(), json!(2));
		repo.save(&created).unwrap();

		let rows = repo.rows();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].get("v"), Some(&json!(2)));

		let id = created.get("id").and_then(Value::as_str).unwrap();
		assert_eq!(repo.get(id).unwrap(), created);
		assert!(matches!(repo.get("missing"), Err(DataError::NotFound { .. })));
	}

	#[test]
	fn save_requires_an_id() {
		let repo = InMemoryRepository::new("config");
		assert!(matches!(repo.save(&Entity::new()), Err(DataError::Save { .. })));
	}

	#[test]
	fn injected_failures_surface() {
		let repo = InMemoryRepository::new("config");
		repo.fail_searches(Some("offline"));
		assert_eq!(
			repo.search(&Criteria::new()).unwrap_err(),
			DataError::Search {
				entity: "config".into(),
				reason: "offline".into(),
			}
		);
		repo.fail_searches(None);
		assert!(repo.search(&Criteria::new()).is_ok());
	}

	#[test]
	fn factory_shares_repositories_per_entity() {
		let factory = InMemoryRepositoryFactory::new();
		factory.repository("a").seed(entity(json!({ "id": "1" })));
		assert_eq!(factory.create("a").search(&Criteria::new()).unwrap().total, 1);
		assert_eq!(factory.create("b").search(&Criteria::new()).unwrap().total, 0);
	}
}
