//! Membership domain: members, their repository, and the member service

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Membership tier deciding discount eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
	Basic,
	Vip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
	pub id: u64,
	pub name: String,
	pub grade: Grade,
}

impl Member {
	pub fn new(id: u64, name: impl Into<String>, grade: Grade) -> Self {
		Self {
			id,
			name: name.into(),
			grade,
		}
	}
}

/// Storage abstraction for members.
///
/// Consumers hold `Arc<dyn MemberRepository>` and never name a concrete
/// store, so swapping the backing implementation is a wiring change only.
pub trait MemberRepository: Send + Sync {
	fn save(&self, member: Member);
	fn find_by_id(&self, id: u64) -> Option<Member>;
}

/// In-memory store, suitable for demos and tests.
#[derive(Default)]
pub struct MemoryMemberRepository {
	store: Mutex<HashMap<u64, Member>>,
}

impl MemoryMemberRepository {
	pub fn new() -> Self {
		Self::default()
	}
}

impl MemberRepository for MemoryMemberRepository {
	fn save(&self, member: Member) {
		tracing::debug!(member_id = member.id, "saving member");
		self.store.lock().insert(member.id, member);
	}

	fn find_by_id(&self, id: u64) -> Option<Member> {
		self.store.lock().get(&id).cloned()
	}
}

/// Signup and lookup on top of a [`MemberRepository`].
pub struct MemberService {
	repository: Arc<dyn MemberRepository>,
}

impl MemberService {
	pub fn new(repository: Arc<dyn MemberRepository>) -> Self {
		Self { repository }
	}

	pub fn join(&self, member: Member) {
		self.repository.save(member);
	}

	pub fn find_member(&self, id: u64) -> Option<Member> {
		self.repository.find_by_id(id)
	}
}
