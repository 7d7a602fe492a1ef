//! Entity model: the closed set of entities and their typed attributes
//!
//! Every entity carries its own attribute enum. Each attribute resolves to a
//! static [`AttributeDescriptor`] (column, label, value kind, filter kind),
//! so column names are never taken from user input without going through
//! this table first.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The stored entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Order,
    Product,
    Supplier,
}

impl EntityKind {
    /// All entities, in display order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Customer,
        EntityKind::Order,
        EntityKind::Product,
        EntityKind::Supplier,
    ];

    /// SQL table backing this entity
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Order => "orders",
            EntityKind::Product => "products",
            EntityKind::Supplier => "suppliers",
        }
    }

    /// Human-readable singular name
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Customer => "Customer",
            EntityKind::Order => "Order",
            EntityKind::Product => "Product",
            EntityKind::Supplier => "Supplier",
        }
    }

    /// All attributes in declaration order, primary key first
    pub fn attributes(&self) -> &'static [Attribute] {
        match self {
            EntityKind::Customer => &CUSTOMER_ATTRIBUTES,
            EntityKind::Order => &ORDER_ATTRIBUTES,
            EntityKind::Product => &PRODUCT_ATTRIBUTES,
            EntityKind::Supplier => &SUPPLIER_ATTRIBUTES,
        }
    }

    /// Non-key attributes, i.e. the positional values accepted by insert
    pub fn data_attributes(&self) -> &'static [Attribute] {
        &self.attributes()[1..]
    }

    /// The primary key attribute
    pub fn primary_key(&self) -> Attribute {
        self.attributes()[0]
    }

    /// Attribute matched by free-text search.
    ///
    /// Orders are searched by the name of the customer who placed them.
    pub fn search_attribute(&self) -> Option<Attribute> {
        match self {
            EntityKind::Customer | EntityKind::Order => {
                Some(Attribute::Customer(CustomerAttr::Name))
            }
            EntityKind::Product => Some(Attribute::Product(ProductAttr::Name)),
            EntityKind::Supplier => Some(Attribute::Supplier(SupplierAttr::Name)),
        }
    }

    /// Position of an attribute within this entity's column order
    pub fn position(&self, attribute: Attribute) -> Option<usize> {
        self.attributes().iter().position(|a| *a == attribute)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "customers" | "cust" => Ok(EntityKind::Customer),
            "order" | "orders" => Ok(EntityKind::Order),
            "product" | "products" | "prod" => Ok(EntityKind::Product),
            "supplier" | "suppliers" | "sup" => Ok(EntityKind::Supplier),
            _ => Err(format!(
                "unknown entity '{}' (valid: customer, order, product, supplier)",
                s
            )),
        }
    }
}

/// Storage/validation kind of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Real,
    /// ISO calendar date stored as text (YYYY-MM-DD)
    Date,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => write!(f, "text"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Real => write!(f, "number"),
            ValueKind::Date => write!(f, "date (YYYY-MM-DD)"),
        }
    }
}

/// How a field can be filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Pick any of the distinct values present
    Categorical,
    /// Inclusive numeric bounds
    Range,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Categorical => write!(f, "categorical"),
            FilterKind::Range => write!(f, "range"),
        }
    }
}

/// Static description of one attribute
#[derive(Debug)]
pub struct AttributeDescriptor {
    pub column: &'static str,
    pub label: &'static str,
    pub kind: ValueKind,
    pub filter: Option<FilterKind>,
    pub primary_key: bool,
}

impl AttributeDescriptor {
    const fn key() -> Self {
        Self {
            column: "id",
            label: "ID",
            kind: ValueKind::Integer,
            filter: None,
            primary_key: true,
        }
    }

    const fn new(
        column: &'static str,
        label: &'static str,
        kind: ValueKind,
        filter: Option<FilterKind>,
    ) -> Self {
        Self {
            column,
            label,
            kind,
            filter,
            primary_key: false,
        }
    }
}

use FilterKind::{Categorical, Range};
use ValueKind::{Date, Integer, Real, Text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CustomerAttr {
    Id,
    Name,
    Email,
    Phone,
    City,
}

static CUSTOMER_DESCRIPTORS: [AttributeDescriptor; 5] = [
    AttributeDescriptor::key(),
    AttributeDescriptor::new("name", "Name", Text, None),
    AttributeDescriptor::new("email", "Email", Text, None),
    AttributeDescriptor::new("phone", "Phone", Text, None),
    AttributeDescriptor::new("city", "City", Text, Some(Categorical)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderAttr {
    Id,
    CustomerId,
    ProductId,
    Date,
    Amount,
    Status,
}

static ORDER_DESCRIPTORS: [AttributeDescriptor; 6] = [
    AttributeDescriptor::key(),
    AttributeDescriptor::new("customer_id", "Customer ID", Integer, Some(Categorical)),
    AttributeDescriptor::new("product_id", "Product ID", Integer, Some(Categorical)),
    AttributeDescriptor::new("date", "Date", Date, None),
    AttributeDescriptor::new("amount", "Amount", Real, Some(Range)),
    AttributeDescriptor::new("status", "Status", Text, Some(Categorical)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductAttr {
    Id,
    Name,
    Category,
    Price,
    Stock,
}

static PRODUCT_DESCRIPTORS: [AttributeDescriptor; 5] = [
    AttributeDescriptor::key(),
    AttributeDescriptor::new("name", "Name", Text, None),
    AttributeDescriptor::new("category", "Category", Text, Some(Categorical)),
    AttributeDescriptor::new("price", "Price", Real, Some(Range)),
    AttributeDescriptor::new("stock", "Stock", Integer, Some(Range)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupplierAttr {
    Id,
    Name,
    Contact,
    Address,
    Email,
}

static SUPPLIER_DESCRIPTORS: [AttributeDescriptor; 5] = [
    AttributeDescriptor::key(),
    AttributeDescriptor::new("name", "Name", Text, None),
    AttributeDescriptor::new("contact", "Contact", Text, None),
    AttributeDescriptor::new("address", "Address", Text, None),
    AttributeDescriptor::new("email", "Email", Text, None),
];

static CUSTOMER_ATTRIBUTES: [Attribute; 5] = [
    Attribute::Customer(CustomerAttr::Id),
    Attribute::Customer(CustomerAttr::Name),
    Attribute::Customer(CustomerAttr::Email),
    Attribute::Customer(CustomerAttr::Phone),
    Attribute::Customer(CustomerAttr::City),
];

static ORDER_ATTRIBUTES: [Attribute; 6] = [
    Attribute::Order(OrderAttr::Id),
    Attribute::Order(OrderAttr::CustomerId),
    Attribute::Order(OrderAttr::ProductId),
    Attribute::Order(OrderAttr::Date),
    Attribute::Order(OrderAttr::Amount),
    Attribute::Order(OrderAttr::Status),
];

static PRODUCT_ATTRIBUTES: [Attribute; 5] = [
    Attribute::Product(ProductAttr::Id),
    Attribute::Product(ProductAttr::Name),
    Attribute::Product(ProductAttr::Category),
    Attribute::Product(ProductAttr::Price),
    Attribute::Product(ProductAttr::Stock),
];

static SUPPLIER_ATTRIBUTES: [Attribute; 5] = [
    Attribute::Supplier(SupplierAttr::Id),
    Attribute::Supplier(SupplierAttr::Name),
    Attribute::Supplier(SupplierAttr::Contact),
    Attribute::Supplier(SupplierAttr::Address),
    Attribute::Supplier(SupplierAttr::Email),
];

/// An attribute of one specific entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Customer(CustomerAttr),
    Order(OrderAttr),
    Product(ProductAttr),
    Supplier(SupplierAttr),
}

impl Attribute {
    /// Entity owning this attribute
    pub fn entity(&self) -> EntityKind {
        match self {
            Attribute::Customer(_) => EntityKind::Customer,
            Attribute::Order(_) => EntityKind::Order,
            Attribute::Product(_) => EntityKind::Product,
            Attribute::Supplier(_) => EntityKind::Supplier,
        }
    }

    pub fn descriptor(&self) -> &'static AttributeDescriptor {
        match *self {
            Attribute::Customer(a) => &CUSTOMER_DESCRIPTORS[a as usize],
            Attribute::Order(a) => &ORDER_DESCRIPTORS[a as usize],
            Attribute::Product(a) => &PRODUCT_DESCRIPTORS[a as usize],
            Attribute::Supplier(a) => &SUPPLIER_DESCRIPTORS[a as usize],
        }
    }

    pub fn column(&self) -> &'static str {
        self.descriptor().column
    }

    pub fn label(&self) -> &'static str {
        self.descriptor().label
    }

    pub fn kind(&self) -> ValueKind {
        self.descriptor().kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.descriptor().primary_key
    }

    /// Table-qualified column reference, e.g. `orders.amount`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.entity().table(), self.column())
    }

    /// Resolve an attribute by column name or label (case-insensitive,
    /// spaces and dashes treated as underscores)
    pub fn parse(entity: EntityKind, name: &str) -> Option<Attribute> {
        let wanted = normalize_name(name);
        entity.attributes().iter().copied().find(|a| {
            normalize_name(a.column()) == wanted || normalize_name(a.label()) == wanted
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity().label(), self.column())
    }
}

/// Marker for the joined customer/order/product view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerOrderView;

/// Columns of the customer/order/product view, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ViewField {
    CustomerId,
    CustomerName,
    OrderDate,
    OrderAmount,
    ProductName,
    ProductPrice,
}

impl ViewField {
    pub const ALL: [ViewField; 6] = [
        ViewField::CustomerId,
        ViewField::CustomerName,
        ViewField::OrderDate,
        ViewField::OrderAmount,
        ViewField::ProductName,
        ViewField::ProductPrice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewField::CustomerId => "Customer ID",
            ViewField::CustomerName => "Customer Name",
            ViewField::OrderDate => "Order Date",
            ViewField::OrderAmount => "Order Amount",
            ViewField::ProductName => "Product Name",
            ViewField::ProductPrice => "Product Price",
        }
    }

    /// Underlying entity attribute this view column is read from
    pub fn source(&self) -> Attribute {
        match self {
            ViewField::CustomerId => Attribute::Customer(CustomerAttr::Id),
            ViewField::CustomerName => Attribute::Customer(CustomerAttr::Name),
            ViewField::OrderDate => Attribute::Order(OrderAttr::Date),
            ViewField::OrderAmount => Attribute::Order(OrderAttr::Amount),
            ViewField::ProductName => Attribute::Product(ProductAttr::Name),
            ViewField::ProductPrice => Attribute::Product(ProductAttr::Price),
        }
    }

    pub fn filter_kind(&self) -> Option<FilterKind> {
        match self {
            ViewField::OrderAmount | ViewField::ProductPrice => Some(FilterKind::Range),
            _ => None,
        }
    }

    pub fn parse(name: &str) -> Option<ViewField> {
        let wanted = normalize_name(name);
        Self::ALL
            .iter()
            .copied()
            .find(|f| normalize_name(f.label()) == wanted)
    }
}

impl fmt::Display for ViewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase and fold spaces/dashes to underscores
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_tables_match_enum_order() {
        for entity in EntityKind::ALL {
            let attrs = entity.attributes();
            assert!(attrs[0].is_primary_key());
            assert!(attrs[1..].iter().all(|a| !a.is_primary_key()));
            assert!(attrs.iter().all(|a| a.entity() == entity));
        }
        assert_eq!(Attribute::Order(OrderAttr::Amount).column(), "amount");
        assert_eq!(Attribute::Product(ProductAttr::Stock).column(), "stock");
        assert_eq!(Attribute::Supplier(SupplierAttr::Email).column(), "email");
    }

    #[test]
    fn test_attribute_parse_accepts_column_and_label() {
        let order = EntityKind::Order;
        assert_eq!(
            Attribute::parse(order, "customer_id"),
            Some(Attribute::Order(OrderAttr::CustomerId))
        );
        assert_eq!(
            Attribute::parse(order, "Customer ID"),
            Some(Attribute::Order(OrderAttr::CustomerId))
        );
        assert_eq!(
            Attribute::parse(order, "AMOUNT"),
            Some(Attribute::Order(OrderAttr::Amount))
        );
        assert_eq!(Attribute::parse(order, "price"), None);
        assert_eq!(
            Attribute::parse(EntityKind::Product, "Id"),
            Some(Attribute::Product(ProductAttr::Id))
        );
    }

    #[test]
    fn test_qualified_column() {
        assert_eq!(
            Attribute::Product(ProductAttr::Price).qualified(),
            "products.price"
        );
    }

    #[test]
    fn test_entity_from_str() {
        assert_eq!("customers".parse::<EntityKind>(), Ok(EntityKind::Customer));
        assert_eq!("Order".parse::<EntityKind>(), Ok(EntityKind::Order));
        assert!("invoice".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_view_field_parse_and_source() {
        assert_eq!(ViewField::parse("Order Amount"), Some(ViewField::OrderAmount));
        assert_eq!(ViewField::parse("product-price"), Some(ViewField::ProductPrice));
        assert_eq!(ViewField::parse("amount"), None);
        assert_eq!(
            ViewField::ProductPrice.source(),
            Attribute::Product(ProductAttr::Price)
        );
        assert_eq!(ViewField::CustomerName.filter_kind(), None);
    }
}
