//! In-memory member store for tests
//!
//! Writes made through a unit of work are staged and only applied on
//! commit, mirroring transaction semantics.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanRecord},
        member::{
            Member, MemberAggregate, MemberWithCategory, MembershipCategory, NewMember,
            NewMembershipCategory,
        },
    },
    repository::{MemberStore, MemberUnitOfWork},
};

#[derive(Default)]
struct State {
    categories: Vec<MembershipCategory>,
    members: Vec<Member>,
    loans: Vec<LoanRecord>,
    next_id: i32,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn aggregate(&self, member: &Member) -> MemberAggregate {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == member.category_id)
            .cloned()
            .unwrap_or(MembershipCategory {
                id: member.category_id,
                description: String::new(),
                total_loans: 0,
            });
        let mut loans: Vec<LoanRecord> = self
            .loans
            .iter()
            .filter(|r| r.loan.member_id == member.id)
            .cloned()
            .collect();
        loans.sort_by_key(|r| (r.loan.date_out, r.loan.id));

        MemberAggregate {
            member: member.clone(),
            category,
            loans,
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    begins: Arc<AtomicUsize>,
    fail_member_insert: bool,
}

impl InMemoryStore {
    /// Every member insert fails, after any category insert has been staged
    pub fn failing_member_insert(mut self) -> Self {
        self.fail_member_insert = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn category_count(&self) -> usize {
        self.lock().categories.len()
    }

    pub fn member_count(&self) -> usize {
        self.lock().members.len()
    }

    pub fn begin_count(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    pub fn member(&self, id: i32) -> Option<Member> {
        self.lock().members.iter().find(|m| m.id == id).cloned()
    }

    pub fn add_category(&self, description: &str, total_loans: i32) -> i32 {
        let mut state = self.lock();
        let id = state.next_id();
        state.categories.push(MembershipCategory {
            id,
            description: description.to_string(),
            total_loans,
        });
        id
    }

    pub fn add_member(&self, category_id: i32, first_name: &str, last_name: &str, date_of_birth: NaiveDate) -> i32 {
        let mut state = self.lock();
        let id = state.next_id();
        state.members.push(Member {
            id,
            category_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            address: "1 Test Road".to_string(),
            date_of_birth,
            profile_image: None,
        });
        id
    }

    pub fn add_loan(&self, member_id: i32, dvd_title: &str, date_out: NaiveDate, date_returned: Option<NaiveDate>) -> i32 {
        let mut state = self.lock();
        let id = state.next_id();
        state.loans.push(LoanRecord {
            loan: Loan {
                id,
                copy_id: id,
                member_id,
                date_out,
                date_due: date_out + Days::new(7),
                date_returned,
            },
            dvd_title: dvd_title.to_string(),
        });
        id
    }
}

#[async_trait]
impl MemberStore for InMemoryStore {
    async fn list_members(&self) -> AppResult<Vec<MemberWithCategory>> {
        let state = self.lock();
        Ok(state
            .members
            .iter()
            .map(|m| {
                let aggregate = state.aggregate(m);
                MemberWithCategory {
                    member: aggregate.member,
                    category: aggregate.category,
                }
            })
            .collect())
    }

    async fn get_aggregate(&self, id: i32) -> AppResult<Option<MemberAggregate>> {
        let state = self.lock();
        Ok(state.members.iter().find(|m| m.id == id).map(|m| state.aggregate(m)))
    }

    async fn find_aggregates_by_last_name(&self, last_name: &str) -> AppResult<Vec<MemberAggregate>> {
        let state = self.lock();
        Ok(state
            .members
            .iter()
            .filter(|m| m.last_name == last_name)
            .map(|m| state.aggregate(m))
            .collect())
    }

    async fn list_aggregates(&self) -> AppResult<Vec<MemberAggregate>> {
        let state = self.lock();
        Ok(state.members.iter().map(|m| state.aggregate(m)).collect())
    }

    async fn member_exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.lock().members.iter().any(|m| m.id == id))
    }

    async fn category_exists(&self, id: i32) -> AppResult<bool> {
        Ok(self.lock().categories.iter().any(|c| c.id == id))
    }

    async fn update_member(&self, member: &Member) -> AppResult<()> {
        let mut state = self.lock();
        match state.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Member with id {} not found!", member.id))),
        }
    }

    async fn delete_member(&self, id: i32) -> AppResult<()> {
        let mut state = self.lock();
        if !state.members.iter().any(|m| m.id == id) {
            return Err(AppError::NotFound(format!("Member with id {} not found!", id)));
        }
        state.members.retain(|m| m.id != id);
        state.loans.retain(|r| r.loan.member_id != id);
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn MemberUnitOfWork>> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.clone(),
            categories: Vec::new(),
            members: Vec::new(),
        }))
    }
}

struct InMemoryUnitOfWork {
    store: InMemoryStore,
    categories: Vec<MembershipCategory>,
    members: Vec<Member>,
}

#[async_trait]
impl MemberUnitOfWork for InMemoryUnitOfWork {
    async fn category_exists(&mut self, id: i32) -> AppResult<bool> {
        Ok(self.categories.iter().any(|c| c.id == id)
            || self.store.lock().categories.iter().any(|c| c.id == id))
    }

    async fn insert_category(&mut self, category: &NewMembershipCategory) -> AppResult<i32> {
        let id = self.store.lock().next_id();
        self.categories.push(MembershipCategory {
            id,
            description: category.description.clone(),
            total_loans: category.total_loans,
        });
        Ok(id)
    }

    async fn insert_member(&mut self, member: &NewMember) -> AppResult<i32> {
        if self.store.fail_member_insert {
            return Err(AppError::Internal("simulated member insert failure".to_string()));
        }
        let id = self.store.lock().next_id();
        self.members.push(Member {
            id,
            category_id: member.category_id,
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            address: member.address.clone(),
            date_of_birth: member.date_of_birth,
            profile_image: member.profile_image.clone(),
        });
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let this = *self;
        let mut state = this.store.lock();
        state.categories.extend(this.categories);
        state.members.extend(this.members);
        Ok(())
    }
}
