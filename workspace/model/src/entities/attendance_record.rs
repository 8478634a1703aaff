use sea_orm::entity::prelude::*;

/// A submitted attendance row. The matric number is the natural key:
/// the unique index on `matric_no` is what actually rejects two
/// submissions racing past the workflow's existence pre-check.
///
/// Geolocation fields are optional; a record submitted without a
/// capture position stores NULL in all four columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub matric_no: String,
    pub course: String,
    /// Server-clock UTC time of the accepted submission.
    pub timestamp: DateTimeUtc,
    #[sea_orm(default_value = "true")]
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Reported accuracy radius of the capture position, in metres.
    pub accuracy: Option<f64>,
    pub location_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
