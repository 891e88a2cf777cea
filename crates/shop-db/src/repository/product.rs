//! # Product Repository
//!
//! Column descriptors for `products`.

use crate::error::DbResult;
use crate::record::{Column, Entity, Fields};
use crate::repository::Repository;
use shop_core::{NewProduct, Product};

/// Columns of the `products` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Id,
    Name,
    Cost,
    Count,
}

impl Column for ProductColumn {
    fn name(self) -> &'static str {
        match self {
            ProductColumn::Id => "id",
            ProductColumn::Name => "name",
            ProductColumn::Cost => "cost",
            ProductColumn::Count => "count",
        }
    }
}

impl Entity for Product {
    type Column = ProductColumn;

    const TABLE: &'static str = "products";
    const NAME: &'static str = "Product";
    const ID: ProductColumn = ProductColumn::Id;

    fn id(&self) -> i64 {
        self.id
    }
}

impl From<NewProduct> for Fields<Product> {
    fn from(new: NewProduct) -> Self {
        Fields::new()
            .with(ProductColumn::Name, new.name)
            .with(ProductColumn::Cost, new.cost)
            .with(ProductColumn::Count, new.count)
    }
}

impl Repository<Product> {
    pub async fn by_name(&self, name: &str) -> DbResult<Option<Product>> {
        self.get(Fields::new().with(ProductColumn::Name, name)).await
    }
}
