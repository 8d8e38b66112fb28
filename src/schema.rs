//! The fixed invoice schema the model is asked to query.
//!
//! Nothing here is introspected from a live database. The description is
//! prompt context; the DDL statements seed the retrieval index.

/// Human-readable description of the five tables, embedded verbatim in prompts.
pub const SCHEMA_DESCRIPTION: &str = "\
Database Schema:

Table: vendors
- id (UUID, PRIMARY KEY)
- name (VARCHAR, NOT NULL)
- email (VARCHAR)
- phone (VARCHAR)
- address (VARCHAR)

Table: customers
- id (UUID, PRIMARY KEY)
- name (VARCHAR, NOT NULL)
- email (VARCHAR)
- phone (VARCHAR)
- address (VARCHAR)

Table: invoices
- id (UUID, PRIMARY KEY)
- invoice_number (VARCHAR, UNIQUE, NOT NULL)
- vendor_id (UUID, FOREIGN KEY -> vendors.id)
- customer_id (UUID, FOREIGN KEY -> customers.id)
- issue_date (TIMESTAMP, NOT NULL)
- due_date (TIMESTAMP, NOT NULL)
- total_amount (DECIMAL(12,2), NOT NULL)
- status (VARCHAR, NOT NULL) -- values: 'paid', 'pending', 'overdue'
- category (VARCHAR)

Table: line_items
- id (UUID, PRIMARY KEY)
- invoice_id (UUID, FOREIGN KEY -> invoices.id)
- description (VARCHAR, NOT NULL)
- quantity (DECIMAL(10,2))
- unit_price (DECIMAL(12,2))
- amount (DECIMAL(12,2))

Table: payments
- id (UUID, PRIMARY KEY)
- invoice_id (UUID, FOREIGN KEY -> invoices.id)
- amount (DECIMAL(12,2))
- payment_date (TIMESTAMP)
- method (VARCHAR)
";

pub const VENDORS_DDL: &str = "\
CREATE TABLE vendors (
    id UUID PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR,
    phone VARCHAR,
    address VARCHAR
);";

pub const CUSTOMERS_DDL: &str = "\
CREATE TABLE customers (
    id UUID PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR,
    phone VARCHAR,
    address VARCHAR
);";

pub const INVOICES_DDL: &str = "\
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR UNIQUE NOT NULL,
    vendor_id UUID REFERENCES vendors(id),
    customer_id UUID REFERENCES customers(id),
    issue_date TIMESTAMP NOT NULL,
    due_date TIMESTAMP NOT NULL,
    total_amount DECIMAL(12,2) NOT NULL,
    status VARCHAR NOT NULL,
    category VARCHAR
);";

pub const LINE_ITEMS_DDL: &str = "\
CREATE TABLE line_items (
    id UUID PRIMARY KEY,
    invoice_id UUID REFERENCES invoices(id),
    description VARCHAR NOT NULL,
    quantity DECIMAL(10,2),
    unit_price DECIMAL(12,2),
    amount DECIMAL(12,2)
);";

pub const PAYMENTS_DDL: &str = "\
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    invoice_id UUID REFERENCES invoices(id),
    amount DECIMAL(12,2),
    payment_date TIMESTAMP,
    method VARCHAR
);";

/// DDL in dependency order (referenced tables first).
pub const SCHEMA_DDL: [&str; 5] = [
    VENDORS_DDL,
    CUSTOMERS_DDL,
    INVOICES_DDL,
    LINE_ITEMS_DDL,
    PAYMENTS_DDL,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_names_every_table() {
        for table in ["vendors", "customers", "invoices", "line_items", "payments"] {
            assert!(
                SCHEMA_DESCRIPTION.contains(&format!("Table: {}", table)),
                "missing {}",
                table
            );
        }
    }

    #[test]
    fn ddl_matches_description() {
        for (ddl, table) in SCHEMA_DDL
            .iter()
            .zip(["vendors", "customers", "invoices", "line_items", "payments"])
        {
            assert!(ddl.starts_with(&format!("CREATE TABLE {} (", table)));
        }
    }
}
