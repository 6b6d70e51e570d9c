//! SeaORM entities.

pub use principal::Entity as PrincipalEntity;
pub use settings::Entity as SettingsEntity;

/// Per-principal settings row.
pub mod settings {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_settings")]
    pub struct Model {
        /// Same value as the owning principal's id.
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub theme: String,
        pub language: String,
        pub timezone: String,
        pub created_at: TimeDateTimeWithTimeZone,
        pub updated_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::principal::Entity",
            from = "Column::Id",
            to = "super::principal::Column::Id",
            on_delete = "Cascade"
        )]
        Principal,
    }

    impl Related<super::principal::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Principal.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Account row of the identity store, in standalone deployments.
pub mod principal {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "principals")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_one = "super::settings::Entity")]
        Settings,
    }

    impl Related<super::settings::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Settings.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
