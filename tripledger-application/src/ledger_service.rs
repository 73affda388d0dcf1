use crate::{
    error::{LedgerError, StoreError},
    model::{Field, FieldValue, Mutation, ShareToggle, TripSnapshot, WriteStatus},
    ports::{Clock, FieldStream, RateSource, TripStore},
};
use rust_decimal::Decimal;
use tokio_stream::{StreamExt, StreamMap};
use tripledger_domain::{
    AnalyticsAggregator, ArchivedSettlement, BalanceCalculator, Booking, CategoryBreakdown,
    CurrencyCode, CurrencyRateTable, Expense, ExpenseDraft, ExpenseId, Member, MemberBalances,
    MemberId, Money, Repayment, SETTLEMENT_EPSILON, SettlementId, SettlementPlanner, ShareStatus,
    ShareStatusResolver, Transfer, Viewpoint,
};

/// Entry point for everything the surrounding application does with a trip.
///
/// Reads recompute from the working snapshot on every call. Mutations
/// validate, change the snapshot, then push the affected field to the store;
/// a rejected write is reported in the returned [`Mutation`] but never undoes
/// the local change.
pub struct LedgerService<S, R, C> {
    store: S,
    rate_source: R,
    clock: C,
    snapshot: TripSnapshot,
}

impl<S, R, C> LedgerService<S, R, C>
where
    S: TripStore,
    R: RateSource,
    C: Clock,
{
    pub fn new(store: S, rate_source: R, clock: C, base: CurrencyCode) -> Self {
        Self {
            store,
            rate_source,
            clock,
            snapshot: TripSnapshot::new(base),
        }
    }

    pub fn snapshot(&self) -> &TripSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the current value of every field.
    pub async fn hydrate(&mut self) -> Result<(), StoreError> {
        for field in Field::ALL {
            let mut stream = self.store.subscribe(field)?;
            let value = stream
                .next()
                .await
                .unwrap_or_else(|| FieldValue::empty(field));
            self.snapshot.apply(value);
        }
        tracing::debug!(
            member_count = self.snapshot.members.len(),
            expense_count = self.snapshot.ledger.len(),
            settlement_count = self.snapshot.archive.len(),
            "Trip hydrated"
        );
        Ok(())
    }

    /// Every field's changes merged into one stream. Feed the items to
    /// [`LedgerService::apply`].
    pub fn updates(&self) -> Result<FieldStream, StoreError> {
        let mut streams = StreamMap::new();
        for field in Field::ALL {
            streams.insert(field, self.store.subscribe(field)?);
        }
        Ok(Box::pin(streams.map(|(_, value)| value)))
    }

    pub fn apply(&mut self, value: FieldValue) {
        tracing::debug!(field = %value.field(), "Applying store update");
        self.snapshot.apply(value);
    }

    pub fn members(&self) -> &[Member] {
        &self.snapshot.members
    }

    pub fn expenses(&self) -> &[Expense] {
        self.snapshot.ledger.expenses()
    }

    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.snapshot.ledger.get(id)
    }

    pub fn rates(&self) -> &CurrencyRateTable {
        &self.snapshot.rates
    }

    /// Archived settlements, newest first.
    pub fn settlement_history(&self) -> &[ArchivedSettlement] {
        self.snapshot.archive.settlements()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.snapshot.bookings
    }

    pub fn booking_cost_in_base(&self, id: &str) -> Option<Money> {
        self.snapshot
            .bookings
            .iter()
            .find(|booking| booking.id == id)
            .map(|booking| booking.cost_in_base(&self.snapshot.rates))
    }

    pub fn balances(&self) -> MemberBalances {
        BalanceCalculator.calculate(
            &self.snapshot.members,
            &self.snapshot.ledger,
            &self.snapshot.rates,
            &self.snapshot.archive,
        )
    }

    pub fn suggested_settlements(&self) -> Vec<Transfer> {
        SettlementPlanner::new().plan(&self.balances())
    }

    pub fn category_breakdown(&self, viewpoint: &Viewpoint) -> CategoryBreakdown<'_> {
        AnalyticsAggregator.by_category(
            viewpoint,
            &self.snapshot.members,
            &self.snapshot.ledger,
            &self.snapshot.rates,
        )
    }

    pub fn team_total(&self) -> Money {
        AnalyticsAggregator.team_total(
            &self.snapshot.members,
            &self.snapshot.ledger,
            &self.snapshot.rates,
        )
    }

    pub fn share_statuses(
        &self,
        expense_id: ExpenseId,
    ) -> Result<Vec<(MemberId, ShareStatus)>, LedgerError> {
        let expense = self
            .snapshot
            .ledger
            .get(expense_id)
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        Ok(ShareStatusResolver.statuses(
            expense,
            &self.balances(),
            &self.snapshot.rates,
            &self.snapshot.archive,
        ))
    }

    pub fn convert(&self, amount: Decimal, from: &CurrencyCode, to: &CurrencyCode) -> Decimal {
        self.snapshot.rates.convert(amount, from, to)
    }

    pub async fn add_expense(
        &mut self,
        draft: ExpenseDraft,
    ) -> Result<Mutation<ExpenseId>, LedgerError> {
        draft.ensure_convertible(&self.snapshot.rates)?;
        let id = self.snapshot.ledger.add(draft, self.clock.now())?;
        tracing::debug!(expense_id = %id, "Expense added");
        Ok(self.persist(Field::Expenses, id).await)
    }

    pub async fn update_expense(
        &mut self,
        id: ExpenseId,
        draft: ExpenseDraft,
    ) -> Result<Mutation<()>, LedgerError> {
        draft.ensure_convertible(&self.snapshot.rates)?;
        self.snapshot.ledger.update(id, draft)?;
        tracing::debug!(expense_id = %id, "Expense updated");
        Ok(self.persist(Field::Expenses, ()).await)
    }

    /// Removes an expense. Settlements that referenced it stay archived.
    pub async fn remove_expense(&mut self, id: ExpenseId) -> Mutation<Option<Expense>> {
        match self.snapshot.ledger.remove(id) {
            Some(expense) => {
                tracing::debug!(expense_id = %id, "Expense removed");
                self.persist(Field::Expenses, Some(expense)).await
            }
            None => Mutation::skipped(None),
        }
    }

    /// Archives a repayment. With `expense_id` it must be a split member
    /// other than the payer paying that expense's payer; the record then
    /// clears the member's whole share, whatever `amount` says.
    pub async fn record_settlement(
        &mut self,
        from: MemberId,
        to: MemberId,
        amount: Money,
        expense_id: Option<ExpenseId>,
    ) -> Result<Mutation<SettlementId>, LedgerError> {
        if let Some(expense_id) = expense_id {
            self.check_scoped_settlement(expense_id, &from, &to, amount)?;
        }

        let repayment = Repayment {
            from,
            to,
            amount,
            expense_id,
        };
        let id = self.snapshot.archive.record(repayment, self.clock.now())?;
        if let Some(settlement) = self.snapshot.archive.get(id) {
            tracing::info!(
                settlement_id = %id,
                from = %settlement.from_id,
                to = %settlement.to_id,
                amount = %settlement.amount,
                expense_id = ?settlement.expense_id,
                "Settlement recorded"
            );
        }
        Ok(self.persist(Field::ArchivedSettlements, id).await)
    }

    /// Removes a settlement. Unknown ids are a no-op.
    pub async fn undo_settlement(&mut self, id: SettlementId) -> Mutation<Option<ArchivedSettlement>> {
        match self.snapshot.archive.undo(id) {
            Some(settlement) => {
                tracing::info!(settlement_id = %id, "Settlement undone");
                self.persist(Field::ArchivedSettlements, Some(settlement))
                    .await
            }
            None => Mutation::skipped(None),
        }
    }

    /// Marks `member`'s share of an expense settled, or unmarks it when it
    /// already is.
    pub async fn toggle_share_settled(
        &mut self,
        expense_id: ExpenseId,
        member: &MemberId,
    ) -> Result<Mutation<ShareToggle>, LedgerError> {
        let expense = self
            .snapshot
            .ledger
            .get(expense_id)
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        let status = ShareStatusResolver.status(
            expense,
            member,
            &self.balances(),
            &self.snapshot.rates,
            &self.snapshot.archive,
        );
        let payer = expense.payer_id.clone();

        match status {
            ShareStatus::Settled(settlement_id) => {
                let mutation = self.undo_settlement(settlement_id).await;
                Ok(Mutation {
                    value: ShareToggle::Undone(settlement_id),
                    write: mutation.write,
                })
            }
            ShareStatus::Outstanding { share } => {
                let mutation = self
                    .record_settlement(member.clone(), payer, share, Some(expense_id))
                    .await?;
                Ok(Mutation {
                    value: ShareToggle::Recorded(mutation.value),
                    write: mutation.write,
                })
            }
            other => Ok(Mutation::skipped(ShareToggle::Unchanged(other))),
        }
    }

    pub async fn set_rate(
        &mut self,
        code: CurrencyCode,
        multiplier: Decimal,
    ) -> Result<Mutation<()>, LedgerError> {
        self.snapshot.rates.set(code, multiplier)?;
        Ok(self.persist(Field::CurrencyRates, ()).await)
    }

    pub async fn remove_rate(&mut self, code: &CurrencyCode) -> Mutation<Option<Decimal>> {
        match self.snapshot.rates.remove(code) {
            Some(rate) => self.persist(Field::CurrencyRates, Some(rate)).await,
            None => Mutation::skipped(None),
        }
    }

    /// Pulls fresh rates for every tracked code. On failure the table is left
    /// exactly as it was.
    pub async fn refresh_rates(&mut self) -> Result<Mutation<usize>, LedgerError> {
        let base = self.snapshot.rates.base().clone();
        let external = match self.rate_source.fetch(&base).await {
            Ok(external) => external,
            Err(err) => {
                tracing::warn!(base = %base, error = %err, "Rate refresh failed; keeping current rates");
                return Err(err.into());
            }
        };

        let replaced = self.snapshot.rates.refresh(&external);
        if replaced == 0 {
            return Ok(Mutation::skipped(0));
        }
        Ok(self.persist(Field::CurrencyRates, replaced).await)
    }

    /// Adds a member, or renames one whose id is already on the roster.
    pub async fn add_member(&mut self, member: Member) -> Mutation<()> {
        match self
            .snapshot
            .members
            .iter_mut()
            .find(|existing| existing.id == member.id)
        {
            Some(existing) if *existing == member => return Mutation::skipped(()),
            Some(existing) => *existing = member,
            None => self.snapshot.members.push(member),
        }
        self.persist(Field::Members, ()).await
    }

    /// Drops a member from the roster. Their expenses and settlements are kept.
    pub async fn remove_member(&mut self, id: &MemberId) -> Mutation<Option<Member>> {
        let Some(index) = self
            .snapshot
            .members
            .iter()
            .position(|member| member.id == *id)
        else {
            return Mutation::skipped(None);
        };
        let removed = self.snapshot.members.remove(index);
        self.persist(Field::Members, Some(removed)).await
    }

    fn check_scoped_settlement(
        &self,
        expense_id: ExpenseId,
        from: &MemberId,
        to: &MemberId,
        amount: Money,
    ) -> Result<(), LedgerError> {
        let expense = self
            .snapshot
            .ledger
            .get(expense_id)
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        let owes_payer =
            expense.is_split_with(from) && *from != expense.payer_id && *to == expense.payer_id;
        if !owes_payer {
            return Err(LedgerError::ShareMismatch {
                expense_id,
                from: from.clone(),
                to: to.clone(),
            });
        }

        let share = BalanceCalculator::share(expense, &self.snapshot.rates);
        if (amount - share).abs() > SETTLEMENT_EPSILON {
            tracing::warn!(
                expense_id = %expense_id,
                from = %from,
                amount = %amount,
                share = %share,
                "Scoped settlement amount differs from the share it clears"
            );
        }
        Ok(())
    }

    async fn persist<T>(&self, field: Field, value: T) -> Mutation<T> {
        let write = match self.store.update(self.snapshot.field_value(field)).await {
            Ok(()) => WriteStatus::Persisted,
            Err(err) => {
                tracing::warn!(field = %field, error = %err, "Store write failed; keeping local state");
                WriteStatus::Failed(err)
            }
        };
        Mutation { value, write }
    }
}
