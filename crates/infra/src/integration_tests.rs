//! Integration tests for the full ledger pipeline.
//!
//! Tests: Warehouse → AllocationEngine → Repository → Projections → Notifier
//!
//! Verifies:
//! - FEFO consumption across batches, including expired stock
//! - Requests are validated before anything is written
//! - Exactly one notification per successful movement call
//! - Concurrent calls never over-consume or expose half-applied state

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    use stockledger_auth::User;
    use stockledger_core::{BatchId, DomainError, ItemId, LocationCode, RoomId, UserId};
    use stockledger_inventory::{
        AuditEntry, Batch, Dimensions, InboundEntry, Item, MovementKind, NewItem, OutboundEntry, Room, StockChange,
        Transaction,
    };

    use crate::repository::{InMemoryRepository, RepoResult, Repository, RepositoryError};
    use crate::{LedgerConfig, LedgerError, Warehouse};

    fn operator() -> UserId {
        UserId::new("operator")
    }

    fn seeded() -> Warehouse<InMemoryRepository> {
        Warehouse::in_memory(LedgerConfig {
            seed_demo: true,
            ..LedgerConfig::default()
        })
        .unwrap()
    }

    fn empty() -> Warehouse<InMemoryRepository> {
        Warehouse::in_memory(LedgerConfig::default()).unwrap()
    }

    fn draft(name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: None,
            dimensions: Dimensions { width: 0.3, height: 0.2, length: 0.3 },
            weight_grams: 500,
            frozen: false,
            expirable: true,
            default_aisle_id: None,
        }
    }

    fn total_of(warehouse: &Warehouse<impl Repository>, item: &str) -> u64 {
        warehouse
            .stock_by_item()
            .unwrap()
            .into_iter()
            .find(|row| row.item.id.as_str() == item)
            .map(|row| row.total)
            .unwrap_or(0)
    }

    fn in_days(days: i64) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::days(days)
    }

    #[test]
    fn expired_juice_is_shipped_before_fresh_juice() {
        let warehouse = seeded();

        let txs = warehouse.ship(&[OutboundEntry::new("SKU-003", 10)], &operator()).unwrap();

        let drawn: Vec<(String, u64)> = txs
            .iter()
            .map(|t| (t.batch_id.as_ref().map(|b| b.to_string()).unwrap_or_default(), t.quantity))
            .collect();
        assert_eq!(drawn, vec![("BATCH-1003".to_string(), 8), ("BATCH-1002".to_string(), 2)]);
        assert_eq!(txs[0].assigned_aisles[0].as_str(), "002/0001/AA02");
        assert_eq!(txs[1].assigned_aisles[0].as_str(), "001/0001/AA04");
        assert_eq!(total_of(&warehouse, "SKU-003"), 58);

        // Exhausted batches stay on record.
        let juice = warehouse
            .stock_by_item()
            .unwrap()
            .into_iter()
            .find(|row| row.item.id.as_str() == "SKU-003")
            .unwrap();
        assert_eq!(juice.batches.len(), 2);
        assert!(juice.batches.iter().any(|b| b.id == BatchId::new("BATCH-1003") && b.quantity == 0));

        let audit = warehouse.recent_audit(Some(2)).unwrap();
        assert!(audit.iter().all(|e| e.action == "transaction-out:SKU-003"));
    }

    #[test]
    fn shipping_without_stock_returns_no_transactions() {
        let warehouse = seeded();
        let txs = warehouse.ship(&[OutboundEntry::new("SKU-002", 5)], &operator()).unwrap();
        assert!(txs.is_empty());
        assert!(warehouse.recent_stock_changes(None).unwrap().is_empty());
    }

    #[test]
    fn unknown_items_are_skipped_silently() {
        let warehouse = seeded();

        let received = warehouse
            .receive(
                &[
                    InboundEntry::new("NOPE-001", 5, in_days(10)),
                    InboundEntry::new("SKU-002", 5, in_days(300)),
                ],
                &operator(),
            )
            .unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].item_id.as_str(), "SKU-002");
        assert_eq!(received[0].batch_id.as_ref().map(|b| b.as_str()), Some("BATCH-1004"));
        // Dried beans have no batch yet, so they go to their default aisle.
        assert_eq!(received[0].assigned_aisles[0].as_str(), "001/0001/AA03");

        let shipped = warehouse.ship(&[OutboundEntry::new("NOPE-001", 1)], &operator()).unwrap();
        assert!(shipped.is_empty());
    }

    #[test]
    fn zero_quantity_rejects_the_whole_call_before_any_write() {
        let warehouse = seeded();
        let feed = warehouse.subscribe_channel();
        let before = warehouse.stock_by_item().unwrap();

        let err = warehouse
            .receive(
                &[
                    InboundEntry::new("SKU-001", 5, in_days(10)),
                    InboundEntry::new("SKU-003", 0, in_days(10)),
                ],
                &operator(),
            )
            .unwrap_err();
        match err {
            LedgerError::Domain(DomainError::Validation(msg)) => assert!(msg.contains("entry 1")),
            other => panic!("Expected Validation error, got {other:?}"),
        }

        let err = warehouse
            .ship(&[OutboundEntry::new("SKU-001", 0)], &operator())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));

        assert_eq!(warehouse.stock_by_item().unwrap(), before);
        assert!(warehouse.recent_audit(None).unwrap().is_empty());
        assert!(feed.try_recv().is_err());
    }

    #[test]
    fn receiving_past_the_quantity_limit_is_rejected_and_the_ledger_stays_usable() {
        let warehouse = seeded();
        let feed = warehouse.subscribe_channel();
        let before = warehouse.stock_by_item().unwrap();

        let err = warehouse
            .receive(
                &[
                    InboundEntry::new("SKU-002", u64::MAX, in_days(10)),
                    InboundEntry::new("SKU-002", 1, in_days(10)),
                ],
                &operator(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));

        // SKU-001 already holds 120 units.
        let err = warehouse
            .receive(&[InboundEntry::new("SKU-001", u64::MAX - 100, in_days(10))], &operator())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));

        assert_eq!(warehouse.stock_by_item().unwrap(), before);
        assert!(feed.try_recv().is_err());

        let txs = warehouse.ship(&[OutboundEntry::new("SKU-001", 1)], &operator()).unwrap();
        assert_eq!(txs.len(), 1);
        warehouse
            .receive(&[InboundEntry::new("SKU-002", u64::MAX, in_days(10))], &operator())
            .unwrap();
        assert_eq!(total_of(&warehouse, "SKU-002"), u64::MAX);
    }

    #[test]
    fn concurrent_receives_notify_in_commit_order() {
        let warehouse = Arc::new(
            Warehouse::in_memory(LedgerConfig {
                notify_capacity: 1_000,
                ..LedgerConfig::default()
            })
            .unwrap(),
        );
        let boots = warehouse.create_item(draft("Boots")).unwrap().id;
        let feed = warehouse.subscribe_channel();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let warehouse = warehouse.clone();
                let boots = boots.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        warehouse
                            .receive(&[InboundEntry::new(boots.clone(), 1, in_days(30))], &operator())
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let notifications = feed.drain();
        assert_eq!(notifications.len(), 400);
        let sequences: Vec<u64> = notifications.iter().map(|n| n.sequence).collect();
        assert_eq!(sequences, (1..=400).collect::<Vec<u64>>());
        let totals: Vec<u64> = notifications.iter().map(|n| n.stock[0].total).collect();
        assert_eq!(totals, (1..=400).collect::<Vec<u64>>());

        let last = notifications.last().unwrap();
        assert_eq!(last.stock, warehouse.stock_by_item().unwrap());
    }

    #[test]
    fn one_notification_per_call_with_full_snapshot() {
        let warehouse = seeded();
        let feed = warehouse.subscribe_channel();

        warehouse
            .receive(
                &[
                    InboundEntry::new("SKU-001", 10, in_days(40)),
                    InboundEntry::new("SKU-001", 5, in_days(50)),
                    InboundEntry::new("SKU-002", 7, in_days(400)),
                ],
                &operator(),
            )
            .unwrap();
        warehouse.ship(&[OutboundEntry::new("SKU-001", 1)], &operator()).unwrap();

        let notifications = feed.drain();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].kind, MovementKind::In);
        assert_eq!(notifications[1].kind, MovementKind::Out);

        let vaccine_after_receive = notifications[0]
            .stock
            .iter()
            .find(|row| row.item.id.as_str() == "SKU-001")
            .map(|row| row.total);
        assert_eq!(vaccine_after_receive, Some(135));
        assert_eq!(notifications[1].stock, warehouse.stock_by_item().unwrap());
    }

    #[test]
    fn panicking_subscriber_does_not_affect_the_ledger_or_other_subscribers() {
        let warehouse = seeded();
        let crashing = warehouse.subscribe_to_stock_changes(|_| panic!("handler bug")).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        warehouse
            .subscribe_to_stock_changes(move |n| {
                let _ = tx.send(n.kind);
            })
            .unwrap();

        warehouse
            .receive(&[InboundEntry::new("SKU-002", 1, in_days(100))], &operator())
            .unwrap();
        assert!(crashing.join().is_err());
        warehouse.ship(&[OutboundEntry::new("SKU-002", 1)], &operator()).unwrap();

        let timeout = StdDuration::from_secs(5);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), MovementKind::In);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), MovementKind::Out);
    }

    #[test]
    fn concurrent_ships_never_over_consume() {
        let warehouse = Arc::new(seeded());
        let available = total_of(&*warehouse, "SKU-003");
        assert_eq!(available, 68);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let warehouse = warehouse.clone();
                thread::spawn(move || {
                    warehouse
                        .ship(&[OutboundEntry::new("SKU-003", available / 2)], &operator())
                        .unwrap()
                })
            })
            .collect();

        let shipped: u64 = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .map(|t| t.quantity)
            .sum();
        assert_eq!(shipped, available);
        assert_eq!(total_of(&*warehouse, "SKU-003"), 0);
    }

    #[test]
    fn two_half_shipments_consume_exactly_the_stock() {
        let warehouse = Arc::new(seeded());
        let half = total_of(&*warehouse, "SKU-003") / 2;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let warehouse = warehouse.clone();
                thread::spawn(move || warehouse.ship(&[OutboundEntry::new("SKU-003", half)], &operator()).unwrap())
            })
            .collect();
        for handle in handles {
            let txs = handle.join().unwrap();
            assert_eq!(txs.iter().map(|t| t.quantity).sum::<u64>(), half);
        }
        assert_eq!(total_of(&*warehouse, "SKU-003"), 0);
    }

    #[test]
    fn readers_never_observe_a_half_applied_call() {
        let warehouse = Arc::new(empty());
        let left = warehouse.create_item(draft("Left Boots")).unwrap().id;
        let right = warehouse.create_item(draft("Right Boots")).unwrap().id;

        let writer = {
            let warehouse = warehouse.clone();
            let (left, right) = (left.clone(), right.clone());
            thread::spawn(move || {
                for _ in 0..200 {
                    warehouse
                        .receive(
                            &[
                                InboundEntry::new(left.clone(), 1, in_days(30)),
                                InboundEntry::new(right.clone(), 1, in_days(30)),
                            ],
                            &operator(),
                        )
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let rows = warehouse.stock_by_item().unwrap();
            assert_eq!(rows[0].total, rows[1].total);
        }
        writer.join().unwrap();
        assert_eq!(total_of(&*warehouse, left.as_str()), 200);
        assert_eq!(total_of(&*warehouse, right.as_str()), 200);
    }

    #[test]
    fn projections_are_idempotent() {
        let warehouse = seeded();
        warehouse.ship(&[OutboundEntry::new("SKU-001", 3)], &operator()).unwrap();

        assert_eq!(warehouse.stock_by_item().unwrap(), warehouse.stock_by_item().unwrap());
        assert_eq!(warehouse.aisle_occupancy().unwrap(), warehouse.aisle_occupancy().unwrap());
        let now = Utc::now();
        assert_eq!(warehouse.dashboard_at(now).unwrap(), warehouse.dashboard_at(now).unwrap());
    }

    #[test]
    fn dashboard_reflects_seeded_expiry_and_outbound_history() {
        let warehouse = seeded();
        warehouse
            .ship(&[OutboundEntry::new("SKU-001", 4), OutboundEntry::new("SKU-003", 10)], &operator())
            .unwrap();

        let dashboard = warehouse.dashboard().unwrap();
        let ids = |batches: &[Batch]| batches.iter().map(|b| b.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(dashboard.expired.as_slice()), vec!["BATCH-1003"]);
        assert_eq!(ids(dashboard.expiring_soon.as_slice()), vec!["BATCH-1001", "BATCH-1002"]);

        let top: Vec<(&str, &str, u64)> = dashboard
            .top_outbound
            .iter()
            .map(|t| (t.item_id.as_str(), t.name.as_str(), t.total_out))
            .collect();
        assert_eq!(top, vec![("SKU-003", "Fresh Juice", 10), ("SKU-001", "Frozen Vaccine", 4)]);
    }

    #[test]
    fn new_items_without_default_land_in_the_first_aisle() {
        let warehouse = seeded();
        let peas = warehouse.create_item(draft("Frozen Peas")).unwrap();
        assert_eq!(peas.id.as_str(), "FRO-004");

        let txs = warehouse
            .receive(&[InboundEntry::new(peas.id.clone(), 12, in_days(90))], &operator())
            .unwrap();
        assert_eq!(txs[0].assigned_aisles[0].as_str(), "001/0001/AA01");

        let occupancy = warehouse.aisle_occupancy().unwrap();
        let first_aisle = &occupancy[0].aisles[0];
        assert_eq!(first_aisle.stock, 132);
        assert_eq!(first_aisle.items, vec!["Frozen Vaccine".to_string(), "Frozen Peas".to_string()]);
    }

    #[test]
    fn deleted_items_keep_their_batches_visible_by_id() {
        let warehouse = seeded();
        assert!(warehouse.delete_item(&ItemId::new("SKU-003")).unwrap());

        assert!(warehouse.stock_by_item().unwrap().iter().all(|r| r.item.id.as_str() != "SKU-003"));
        let occupancy = warehouse.aisle_occupancy().unwrap();
        let room2_aisle2 = &occupancy[1].aisles[1];
        assert_eq!(room2_aisle2.items, vec!["SKU-003".to_string()]);
        assert_eq!(room2_aisle2.stock, 8);

        // Orphaned stock can still be shipped.
        let txs = warehouse.ship(&[OutboundEntry::new("SKU-003", 1)], &operator()).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn audit_and_stock_change_feeds_are_newest_first_and_limited() {
        let warehouse = seeded();
        for days in 1..=3 {
            warehouse
                .receive(&[InboundEntry::new("SKU-002", days as u64, in_days(days))], &operator())
                .unwrap();
        }

        let changes = warehouse.recent_stock_changes(Some(2)).unwrap();
        assert_eq!(changes.iter().map(|c| c.quantity).collect::<Vec<_>>(), vec![3, 2]);
        assert_eq!(warehouse.recent_stock_changes(None).unwrap().len(), 3);

        let audit = warehouse.recent_audit(Some(1)).unwrap();
        assert_eq!(audit[0].action, "transaction-in:SKU-002");
        assert_eq!(audit[0].user_id, operator());
    }

    #[test]
    fn storage_and_users_go_through_the_facade() {
        let warehouse = seeded();
        let room = warehouse.add_room("Overflow", 0).unwrap();
        // Third room overall, so room index 2.
        assert_eq!(room.aisles[0].label.as_str(), "001/0003/AA01");
        let aisle = warehouse.add_aisle(&room.id, Some(false)).unwrap();
        assert_eq!(aisle.label.as_str(), "001/0003/AA03");
        assert!(warehouse.remove_aisle(&room.id, &aisle.id).unwrap());
        assert!(warehouse.add_aisle(&RoomId::new(), None).unwrap_err().is_not_found());
        assert_eq!(warehouse.rooms().unwrap().len(), 3);

        assert_eq!(warehouse.login("operator").unwrap().map(|u| u.name), Some("Operator".to_string()));
        assert_eq!(warehouse.list_users().unwrap().len(), 2);
    }

    /// Repository whose audit log is unavailable.
    struct AuditDown(InMemoryRepository);

    impl Repository for AuditDown {
        fn list_items(&self) -> RepoResult<Vec<Item>> {
            self.0.list_items()
        }
        fn get_item(&self, id: &ItemId) -> RepoResult<Option<Item>> {
            self.0.get_item(id)
        }
        fn item_count(&self) -> RepoResult<usize> {
            self.0.item_count()
        }
        fn insert_item(&self, item: Item) -> RepoResult<()> {
            self.0.insert_item(item)
        }
        fn update_item(&self, item: Item) -> RepoResult<bool> {
            self.0.update_item(item)
        }
        fn delete_item(&self, id: &ItemId) -> RepoResult<bool> {
            self.0.delete_item(id)
        }
        fn list_batches(&self) -> RepoResult<Vec<Batch>> {
            self.0.list_batches()
        }
        fn batches_for_item(&self, item_id: &ItemId) -> RepoResult<Vec<Batch>> {
            self.0.batches_for_item(item_id)
        }
        fn batches_in_aisle(&self, aisle: &LocationCode) -> RepoResult<Vec<Batch>> {
            self.0.batches_in_aisle(aisle)
        }
        fn batch_count(&self) -> RepoResult<usize> {
            self.0.batch_count()
        }
        fn insert_batch(&self, batch: Batch) -> RepoResult<()> {
            self.0.insert_batch(batch)
        }
        fn set_batch_quantity(&self, id: &BatchId, quantity: u64) -> RepoResult<()> {
            self.0.set_batch_quantity(id, quantity)
        }
        fn append_transaction(&self, tx: Transaction) -> RepoResult<()> {
            self.0.append_transaction(tx)
        }
        fn list_transactions(&self) -> RepoResult<Vec<Transaction>> {
            self.0.list_transactions()
        }
        fn append_stock_change(&self, change: StockChange) -> RepoResult<()> {
            self.0.append_stock_change(change)
        }
        fn recent_stock_changes(&self, limit: usize) -> RepoResult<Vec<StockChange>> {
            self.0.recent_stock_changes(limit)
        }
        fn append_audit(&self, _entry: AuditEntry) -> RepoResult<()> {
            Err(RepositoryError::Unavailable("audit log offline".to_string()))
        }
        fn recent_audit(&self, limit: usize) -> RepoResult<Vec<AuditEntry>> {
            self.0.recent_audit(limit)
        }
        fn list_rooms(&self) -> RepoResult<Vec<Room>> {
            self.0.list_rooms()
        }
        fn get_room(&self, id: &RoomId) -> RepoResult<Option<Room>> {
            self.0.get_room(id)
        }
        fn insert_room(&self, room: Room) -> RepoResult<()> {
            self.0.insert_room(room)
        }
        fn update_room(&self, room: Room) -> RepoResult<bool> {
            self.0.update_room(room)
        }
        fn list_users(&self) -> RepoResult<Vec<User>> {
            self.0.list_users()
        }
        fn get_user(&self, id: &UserId) -> RepoResult<Option<User>> {
            self.0.get_user(id)
        }
        fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
            self.0.find_user_by_username(username)
        }
        fn insert_user(&self, user: User) -> RepoResult<()> {
            self.0.insert_user(user)
        }
        fn update_user(&self, user: User) -> RepoResult<bool> {
            self.0.update_user(user)
        }
    }

    #[test]
    fn audit_failure_fails_the_movement_and_suppresses_the_notification() {
        let repo = Arc::new(AuditDown(InMemoryRepository::new()));
        let warehouse = Warehouse::new(
            repo.clone(),
            LedgerConfig {
                seed_demo: true,
                ..LedgerConfig::default()
            },
        )
        .unwrap();
        let feed = warehouse.subscribe_channel();

        let err = warehouse
            .ship(&[OutboundEntry::new("SKU-001", 1)], &operator())
            .unwrap_err();
        assert!(matches!(err, LedgerError::Repository(RepositoryError::Unavailable(_))));
        assert!(feed.try_recv().is_err());

        // The batch write preceding the failed audit append stays committed.
        assert_eq!(total_of(&warehouse, "SKU-001"), 119);

        assert!(matches!(
            warehouse.create_item(draft("Oats")),
            Err(LedgerError::Repository(RepositoryError::Unavailable(_)))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: receiving N entries for a known item creates N batches
        /// whose quantities add up to what was requested.
        #[test]
        fn received_quantities_are_preserved(
            quantities in prop::collection::vec(1u64..1_000, 1..20),
            offsets in prop::collection::vec(-30i64..365, 20),
        ) {
            let warehouse = empty();
            let item = warehouse.create_item(draft("Bananas")).unwrap();
            let entries: Vec<InboundEntry> = quantities
                .iter()
                .zip(&offsets)
                .map(|(qty, days)| InboundEntry::new(item.id.clone(), *qty, in_days(*days)))
                .collect();

            let txs = warehouse.receive(&entries, &operator()).unwrap();

            prop_assert_eq!(txs.len(), quantities.len());
            prop_assert_eq!(total_of(&warehouse, item.id.as_str()), quantities.iter().sum::<u64>());
            for (n, tx) in txs.iter().enumerate() {
                prop_assert_eq!(tx.batch_id.clone(), Some(BatchId::new(format!("BATCH-{}", 1001 + n))));
            }
        }

        /// Property: shipping never takes more than requested nor more than
        /// is on hand.
        #[test]
        fn shipped_quantity_is_bounded(
            stock in prop::collection::vec(0u64..50, 1..8),
            requested in 1u64..500,
        ) {
            let warehouse = empty();
            let item = warehouse.create_item(draft("Cherries")).unwrap();
            let entries: Vec<InboundEntry> = stock
                .iter()
                .filter(|q| **q > 0)
                .enumerate()
                .map(|(n, qty)| InboundEntry::new(item.id.clone(), *qty, in_days(n as i64)))
                .collect();
            if !entries.is_empty() {
                warehouse.receive(&entries, &operator()).unwrap();
            }
            let on_hand = total_of(&warehouse, item.id.as_str());

            let txs = warehouse.ship(&[OutboundEntry::new(item.id.clone(), requested)], &operator()).unwrap();
            let shipped: u64 = txs.iter().map(|t| t.quantity).sum();

            prop_assert_eq!(shipped, requested.min(on_hand));
            prop_assert_eq!(total_of(&warehouse, item.id.as_str()), on_hand - shipped);
        }
    }
}
