//! Members repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{LoanRecord, LoanTitleRow},
        member::{
            Member, MemberAggregate, MemberCategoryRow, MemberWithCategory, NewMember,
            NewMembershipCategory,
        },
    },
};

const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.category_id, m.first_name, m.last_name, m.address,
           m.date_of_birth, m.profile_image,
           c.description AS category_description,
           c.total_loans AS category_total_loans
    FROM members m
    JOIN membership_categories c ON c.id = m.category_id
"#;

/// Read and write access to members and their loan history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// All members with their category, ordered by id
    async fn list_members(&self) -> AppResult<Vec<MemberWithCategory>>;

    /// One member with category and full loan history
    async fn get_aggregate(&self, id: i32) -> AppResult<Option<MemberAggregate>>;

    /// Members whose last name matches exactly, with category and loans
    async fn find_aggregates_by_last_name(&self, last_name: &str) -> AppResult<Vec<MemberAggregate>>;

    /// Every member with category and loans, ordered by id
    async fn list_aggregates(&self) -> AppResult<Vec<MemberAggregate>>;

    async fn member_exists(&self, id: i32) -> AppResult<bool>;

    async fn category_exists(&self, id: i32) -> AppResult<bool>;

    /// Replace every mutable column of an existing member; `NotFound` when no row matched
    async fn update_member(&self, member: &Member) -> AppResult<()>;

    /// `NotFound` when no row matched
    async fn delete_member(&self, id: i32) -> AppResult<()>;

    /// Open a unit of work for multi-row writes
    async fn begin(&self) -> AppResult<Box<dyn MemberUnitOfWork>>;
}

/// Writes grouped in a single transaction.
///
/// Nothing is visible to other readers until `commit`; dropping the value
/// without committing rolls every write back.
#[async_trait]
pub trait MemberUnitOfWork: Send {
    async fn category_exists(&mut self, id: i32) -> AppResult<bool>;

    /// Insert a category and return its assigned id
    async fn insert_category(&mut self, category: &NewMembershipCategory) -> AppResult<i32>;

    /// Insert a member and return its assigned id
    async fn insert_member(&mut self, member: &NewMember) -> AppResult<i32>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Load loans (with DVD titles) for the given members and attach them
    async fn with_loans(&self, rows: Vec<MemberCategoryRow>) -> AppResult<Vec<MemberAggregate>> {
        let members: Vec<MemberWithCategory> = rows.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = members.iter().map(|m| m.member.id).collect();
        let loan_rows = sqlx::query_as::<_, LoanTitleRow>(
            r#"
            SELECT l.id, l.copy_id, l.member_id, l.date_out, l.date_due, l.date_returned,
                   d.title AS dvd_title
            FROM loans l
            JOIN dvd_copies dc ON dc.id = l.copy_id
            JOIN dvds d ON d.id = dc.dvd_id
            WHERE l.member_id = ANY($1)
            ORDER BY l.date_out, l.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut loans_by_member: HashMap<i32, Vec<LoanRecord>> = HashMap::new();
        for row in loan_rows {
            let record = LoanRecord::from(row);
            loans_by_member.entry(record.loan.member_id).or_default().push(record);
        }

        Ok(members
            .into_iter()
            .map(|m| MemberAggregate {
                loans: loans_by_member.remove(&m.member.id).unwrap_or_default(),
                member: m.member,
                category: m.category,
            })
            .collect())
    }
}

#[async_trait]
impl MemberStore for MembersRepository {
    async fn list_members(&self) -> AppResult<Vec<MemberWithCategory>> {
        let rows = sqlx::query_as::<_, MemberCategoryRow>(&format!("{} ORDER BY m.id", MEMBER_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_aggregate(&self, id: i32) -> AppResult<Option<MemberAggregate>> {
        let row = sqlx::query_as::<_, MemberCategoryRow>(&format!("{} WHERE m.id = $1", MEMBER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.with_loans(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_aggregates_by_last_name(&self, last_name: &str) -> AppResult<Vec<MemberAggregate>> {
        let rows = sqlx::query_as::<_, MemberCategoryRow>(&format!(
            "{} WHERE m.last_name = $1 ORDER BY m.id",
            MEMBER_SELECT
        ))
        .bind(last_name)
        .fetch_all(&self.pool)
        .await?;

        self.with_loans(rows).await
    }

    async fn list_aggregates(&self) -> AppResult<Vec<MemberAggregate>> {
        let rows = sqlx::query_as::<_, MemberCategoryRow>(&format!("{} ORDER BY m.id", MEMBER_SELECT))
            .fetch_all(&self.pool)
            .await?;

        self.with_loans(rows).await
    }

    async fn member_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn category_exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM membership_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn update_member(&self, member: &Member) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE members SET
                category_id = $1, first_name = $2, last_name = $3,
                address = $4, date_of_birth = $5, profile_image = $6
            WHERE id = $7
            "#,
        )
        .bind(member.category_id)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.address)
        .bind(member.date_of_birth)
        .bind(&member.profile_image)
        .bind(member.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found!", member.id)));
        }
        Ok(())
    }

    async fn delete_member(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found!", id)));
        }
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn MemberUnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgMemberUnitOfWork { tx }))
    }
}

/// Unit of work backed by a Postgres transaction (rolled back on drop)
pub struct PgMemberUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl MemberUnitOfWork for PgMemberUnitOfWork {
    async fn category_exists(&mut self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM membership_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn insert_category(&mut self, category: &NewMembershipCategory) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO membership_categories (description, total_loans) VALUES ($1, $2) RETURNING id",
        )
        .bind(&category.description)
        .bind(category.total_loans)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_member(&mut self, member: &NewMember) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO members (category_id, first_name, last_name, address, date_of_birth, profile_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(member.category_id)
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(&member.address)
        .bind(member.date_of_birth)
        .bind(&member.profile_image)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
