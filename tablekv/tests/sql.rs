//! End-to-end SQL scenarios against a two-table schema.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use tablekv::{
    CResult, Catalog, Engine, Entity, Error, ResultRecord, Schema, SqlEntity, SqlRow, Table,
    TableMeta, Value, ValueIndex,
};

#[derive(Clone, Debug, PartialEq)]
struct Book {
    id: i32,
    title: String,
    quantity: i32,
}

impl Entity for Book {
    type Key = i32;

    fn primary_key(&self) -> i32 {
        self.id
    }
}

impl SqlRow for Book {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "Id" => Some(self.id.into()),
            "Title" => Some(self.title.clone().into()),
            "Quantity" => Some(self.quantity.into()),
            _ => None,
        }
    }
}

impl SqlEntity for Book {
    const ATTRIBUTES: &'static [&'static str] = &["Id", "Title", "Quantity"];

    fn with_attribute(&self, name: &str, value: &Value) -> CResult<Self> {
        let mut next = self.clone();
        match name {
            "Id" => next.id = value.as_i32()?,
            "Title" => next.title = value.as_str()?.to_string(),
            "Quantity" => next.quantity = value.as_i32()?,
            _ => return Err(Error::value(format!("no attribute {name}"))),
        }
        Ok(next)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Order {
    id: i32,
    book_id: i32,
    courier: Option<String>,
}

impl Entity for Order {
    type Key = i32;

    fn primary_key(&self) -> i32 {
        self.id
    }
}

impl SqlRow for Order {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "Id" => Some(self.id.into()),
            "BookId" => Some(self.book_id.into()),
            "Courier" => Some(self.courier.clone().into()),
            _ => None,
        }
    }
}

impl SqlEntity for Order {
    const ATTRIBUTES: &'static [&'static str] = &["Id", "BookId", "Courier"];

    fn with_attribute(&self, name: &str, value: &Value) -> CResult<Self> {
        let mut next = self.clone();
        match name {
            "Id" => next.id = value.as_i32()?,
            "BookId" => next.book_id = value.as_i32()?,
            "Courier" => {
                next.courier =
                    if value.is_null() { None } else { Some(value.as_str()?.to_string()) }
            }
            _ => return Err(Error::value(format!("no attribute {name}"))),
        }
        Ok(next)
    }
}

#[derive(Clone)]
struct Bookstore {
    books: Table<Book>,
    orders: Table<Order>,
    orders_by_book: ValueIndex<i32, Order>,
}

impl Bookstore {
    fn new() -> Self {
        let mut orders = Table::builder();
        let orders_by_book = orders.add_value_index(|o: &Order| o.book_id);
        Self { books: Table::new(), orders: orders.build(), orders_by_book }
    }
}

impl Schema for Bookstore {
    fn catalog() -> Catalog<Self> {
        Catalog::new()
            .table(TableMeta::new::<Book>("Books", |s: &Self| &s.books, |s| &mut s.books))
            .table(TableMeta::new::<Order>("Orders", |s: &Self| &s.orders, |s| &mut s.orders))
    }
}

#[derive(Debug, PartialEq)]
struct BookView {
    id: i64,
    quantity: i64,
}

impl ResultRecord for BookView {
    fn columns() -> &'static [&'static str] {
        &["Id", "Quantity"]
    }

    fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self> {
        Ok(Self { id: values["Id"].as_i64()?, quantity: values["Quantity"].as_i64()? })
    }
}

#[derive(Debug, PartialEq)]
struct IdView {
    id: i64,
}

impl ResultRecord for IdView {
    fn columns() -> &'static [&'static str] {
        &["Id"]
    }

    fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self> {
        Ok(Self { id: values["Id"].as_i64()? })
    }
}

/// Ten books with ids 1..=10, each titled `book_<id>` with quantity 1.
fn bookstore() -> Engine<Bookstore> {
    let engine = Engine::new(Bookstore::new());
    engine
        .write_transaction(|ctx| {
            for id in 1..=10 {
                ctx.schema_mut().books.set(Book {
                    id,
                    title: format!("book_{id}"),
                    quantity: 1,
                });
            }
            Ok(())
        })
        .unwrap();
    engine
}

#[test]
fn select_all_preserves_id_order() {
    let engine = bookstore();
    let rows = engine.query::<BookView>("SELECT Id, Quantity FROM Books").unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0], BookView { id: 1, quantity: 1 });
    assert_eq!(rows[1], BookView { id: 2, quantity: 1 });
    assert!(rows.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn select_with_each_comparison() {
    let engine = bookstore();
    for (filter, expected) in [
        ("Id <= 3", 3),
        ("Id >= 3", 8),
        ("Id = 3", 1),
        ("Id <> 3", 9),
        ("Id < 3", 2),
        ("Id > 3", 7),
    ] {
        let rows = engine
            .query::<BookView>(&format!("SELECT Id, Quantity FROM Books WHERE {filter}"))
            .unwrap();
        assert_eq!(rows.len(), expected, "filter {filter}");
    }
}

#[test]
fn select_with_logical_connectives() {
    let engine = bookstore();
    let rows = engine
        .query::<BookView>("SELECT Id, Quantity FROM Books WHERE Id >= 3 AND Id <= 5")
        .unwrap();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 4, 5]);

    let rows = engine
        .query::<BookView>("SELECT Id, Quantity FROM Books WHERE Id = 1 OR Id = 9 OR Id = 10")
        .unwrap();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 9, 10]);

    let rows = engine
        .query::<BookView>("SELECT Id, Quantity FROM Books WHERE NOT Id <= 8")
        .unwrap();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![9, 10]);
}

#[test]
fn keywords_and_names_are_case_insensitive() {
    let engine = bookstore();
    let rows = engine
        .query::<BookView>("select id, quantity from books where id <= 3")
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn update_with_filter() {
    let engine = bookstore();
    let none = engine
        .execute_sql::<BookView>("UPDATE Books SET Quantity = 5 WHERE Id <= 3")
        .unwrap();
    assert!(none.is_none());

    let rows = engine.query::<BookView>("SELECT Id, Quantity FROM Books").unwrap();
    assert_eq!(rows.iter().filter(|r| r.quantity == 5).count(), 3);
    assert_eq!(rows.iter().filter(|r| r.quantity == 1).count(), 7);
}

#[test]
fn execute_reports_matched_rows() {
    let engine = bookstore();
    assert_eq!(engine.execute("UPDATE Books SET Quantity = 5 WHERE Id <= 3").unwrap(), 3);
    assert_eq!(engine.execute("UPDATE Books SET Quantity = 7 WHERE Id > 100").unwrap(), 0);
}

#[test]
fn update_set_from_another_column() {
    let engine = bookstore();
    engine.execute("UPDATE Books SET Quantity = Id").unwrap();
    let rows = engine.query::<BookView>("SELECT Id, Quantity FROM Books").unwrap();
    assert!(rows.iter().all(|r| r.quantity == r.id));
}

#[test]
fn update_keeps_indexes_consistent() {
    let engine = bookstore();
    engine
        .write_transaction(|ctx| {
            let schema = ctx.schema_mut();
            schema.orders.set(Order { id: 1, book_id: 7, courier: None });
            schema.orders.set(Order { id: 2, book_id: 7, courier: None });
            Ok(())
        })
        .unwrap();

    engine.execute("UPDATE Orders SET BookId = 9 WHERE Id = 2").unwrap();

    engine.read_transaction(|ctx| {
        let schema = ctx.schema();
        let seven: Vec<i32> =
            schema.orders.find(&schema.orders_by_book, &7).iter().map(|o| o.id).collect();
        assert_eq!(seven, vec![1]);
        let nine: Vec<i32> =
            schema.orders.find(&schema.orders_by_book, &9).iter().map(|o| o.id).collect();
        assert_eq!(nine, vec![2]);
    });
}

#[test]
fn value_index_find_after_delete() {
    let engine = bookstore();
    engine
        .write_transaction(|ctx| {
            let schema = ctx.schema_mut();
            for id in 1..=3 {
                schema.orders.set(Order { id, book_id: 7, courier: None });
            }
            Ok(())
        })
        .unwrap();

    engine
        .write_transaction(|ctx| {
            ctx.schema_mut().orders.delete(&2);
            Ok(())
        })
        .unwrap();

    engine.read_transaction(|ctx| {
        let schema = ctx.schema();
        let mut ids: Vec<i32> =
            schema.orders.find(&schema.orders_by_book, &7).iter().map(|o| o.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    });
}

#[test]
fn aliases_bind_result_columns() {
    #[derive(Debug, PartialEq)]
    struct StockView {
        book_id: i64,
        stock: i64,
    }

    impl ResultRecord for StockView {
        fn columns() -> &'static [&'static str] {
            &["BookId", "Stock"]
        }

        fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self> {
            Ok(Self { book_id: values["BookId"].as_i64()?, stock: values["Stock"].as_i64()? })
        }
    }

    let engine = bookstore();
    let rows = engine
        .query::<StockView>("SELECT Id AS BookId, Quantity AS Stock FROM Books WHERE Id = 4")
        .unwrap();
    assert_eq!(rows, vec![StockView { book_id: 4, stock: 1 }]);
}

#[test]
fn unprojected_columns_pass_through_from_the_entity() {
    #[derive(Debug, PartialEq)]
    struct TitledView {
        id: i64,
        title: String,
    }

    impl ResultRecord for TitledView {
        fn columns() -> &'static [&'static str] {
            &["Id", "Title"]
        }

        fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self> {
            Ok(Self {
                id: values["Id"].as_i64()?,
                title: values["Title"].as_str()?.to_string(),
            })
        }
    }

    let engine = bookstore();
    // Title is not in the projection list; it binds straight to the entity
    // attribute of the same name.
    let rows = engine.query::<TitledView>("SELECT Id FROM Books WHERE Id = 2").unwrap();
    assert_eq!(rows, vec![TitledView { id: 2, title: "book_2".into() }]);
}

#[test]
fn is_null_filters() {
    let engine = bookstore();
    engine
        .write_transaction(|ctx| {
            let schema = ctx.schema_mut();
            schema.orders.set(Order { id: 1, book_id: 3, courier: None });
            schema.orders.set(Order { id: 2, book_id: 3, courier: Some("dhl".into()) });
            schema.orders.set(Order { id: 3, book_id: 4, courier: None });
            Ok(())
        })
        .unwrap();

    let rows = engine.query::<IdView>("SELECT Id FROM Orders WHERE Courier IS NULL").unwrap();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);

    let rows =
        engine.query::<IdView>("SELECT Id FROM Orders WHERE Courier IS NOT NULL").unwrap();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);

    // NULL satisfies no ordinary comparison, in either direction.
    let rows =
        engine.query::<IdView>("SELECT Id FROM Orders WHERE Courier = 1").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn planner_errors_surface_before_any_transaction() {
    let engine = bookstore();

    assert_eq!(
        engine.query::<BookView>("SELECT Foo FROM Books"),
        Err(Error::UnknownColumn { table: "Books".into(), column: "Foo".into() }),
    );
    assert_eq!(
        engine.query::<BookView>("SELECT Id FROM Nope"),
        Err(Error::UnknownTable("Nope".into())),
    );
    assert_eq!(
        engine.query::<BookView>("SELECT 1+2 FROM Books"),
        Err(Error::NotImplemented("arithmetic expression '+'".into())),
    );
    assert_eq!(
        engine.execute("UPDATE Books SET Quantity = Quantity + 1"),
        Err(Error::NotImplemented("arithmetic expression '+'".into())),
    );
    assert_eq!(
        engine.execute("UPDATE Books SET Nope = 1"),
        Err(Error::UnknownColumn { table: "Books".into(), column: "Nope".into() }),
    );

    // A result column that is neither projected nor an entity attribute.
    #[derive(Debug, PartialEq)]
    struct Unfillable {
        book_id: i64,
    }

    impl ResultRecord for Unfillable {
        fn columns() -> &'static [&'static str] {
            &["BookId"]
        }

        fn from_values(values: &HashMap<&'static str, Value>) -> CResult<Self> {
            Ok(Self { book_id: values["BookId"].as_i64()? })
        }
    }

    assert_eq!(
        engine.query::<Unfillable>("SELECT Id FROM Books"),
        Err(Error::ColumnBinding("BookId".into())),
    );
}

#[test]
fn statement_mode_mismatches() {
    let engine = bookstore();
    assert_eq!(
        engine.query::<BookView>("UPDATE Books SET Quantity = 5"),
        Err(Error::ReadOnly("UPDATE".into())),
    );
    assert_eq!(
        engine.execute("SELECT Id FROM Books"),
        Err(Error::NotImplemented("SELECT through the write-only entry point".into())),
    );
}

#[test]
fn parse_errors_carry_positions() {
    let engine = bookstore();
    let err = engine.query::<BookView>("SELEC Id FROM Books").unwrap_err();
    assert!(matches!(err, Error::Parse { pos: 0, .. }), "{err:?}");
}

#[test]
fn failed_update_publishes_nothing() {
    let engine = bookstore();
    // 3_000_000_000 does not fit the 32-bit Quantity attribute, so the
    // write transaction aborts after having touched some rows.
    let err = engine.execute("UPDATE Books SET Quantity = 3000000000").unwrap_err();
    assert!(matches!(err, Error::Value(_)), "{err:?}");

    let rows = engine.query::<BookView>("SELECT Id, Quantity FROM Books").unwrap();
    assert!(rows.iter().all(|r| r.quantity == 1));
}

#[test]
fn status_reports_tables_and_rows() {
    let engine = bookstore();
    let status = engine.status();
    assert_eq!(status.tables, 2);
    assert_eq!(status.rows, 10);
}
