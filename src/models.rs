use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = trucks)]
pub struct Truck {
    pub id: Uuid,
    pub name: String,
    pub plate: String,
    pub capacity: Decimal,
    pub manual_status: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub owner: Option<String>,
    pub owner_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = trucks)]
pub struct NewTruck {
    pub id: Uuid,
    pub name: String,
    pub plate: String,
    pub capacity: Decimal,
    pub manual_status: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub owner: Option<String>,
    pub owner_phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = hire_outs)]
#[diesel(belongs_to(Truck))]
pub struct HireOut {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub load_amount: Decimal,
    pub load_type: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub advance_payment: Option<Decimal>,
    pub payment_method: Option<String>,
    pub total_earnings: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = hire_outs)]
pub struct NewHireOut {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub load_amount: Decimal,
    pub load_type: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub advance_payment: Option<Decimal>,
    pub payment_method: Option<String>,
    pub total_earnings: Decimal,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = maintenances)]
#[diesel(belongs_to(Truck))]
#[diesel(belongs_to(HireOut, foreign_key = hire_out_id))]
pub struct Maintenance {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub hire_out_id: Option<Uuid>,
    pub name: Option<String>,
    pub maintenance_type: String,
    pub cost: Decimal,
    pub date: NaiveDateTime,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = maintenances)]
pub struct NewMaintenance {
    pub id: Uuid,
    pub truck_id: Uuid,
    pub hire_out_id: Option<Uuid>,
    pub name: Option<String>,
    pub maintenance_type: String,
    pub cost: Decimal,
    pub date: NaiveDateTime,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = transactions)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction {
    pub id: Uuid,
    pub kind: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: NaiveDateTime,
}
