use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Completed,
    TurnElapsedMs,
    GameElapsedMs,
    TotalElapsedMs,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum SessionPlayers {
    Table,
    Id,
    SessionId,
    PlayerUid,
    TurnOrder,
    DisplayName,
    Side,
    Color,
    BackgroundImage,
    TotalVp,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Turns {
    Table,
    Id,
    SessionId,
    TurnNo,
    PlayerUid,
    DurationMs,
    VpDeltas,
    PlayedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // sessions
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(Sessions::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sessions::TurnElapsedMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Sessions::GameElapsedMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Sessions::TotalElapsedMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Sessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // session_players
        manager
            .create_table(
                Table::create()
                    .table(SessionPlayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionPlayers::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::SessionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SessionPlayers::PlayerUid).string().not_null())
                    .col(
                        ColumnDef::new(SessionPlayers::TurnOrder)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::DisplayName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SessionPlayers::Side).string().null())
                    .col(ColumnDef::new(SessionPlayers::Color).string().null())
                    .col(ColumnDef::new(SessionPlayers::BackgroundImage).string().null())
                    .col(
                        ColumnDef::new(SessionPlayers::TotalVp)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_players_session_id")
                            .from(SessionPlayers::Table, SessionPlayers::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_session_players_session_uid")
                    .table(SessionPlayers::Table)
                    .col(SessionPlayers::SessionId)
                    .col(SessionPlayers::PlayerUid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_session_players_session_name")
                    .table(SessionPlayers::Table)
                    .col(SessionPlayers::SessionId)
                    .col(SessionPlayers::DisplayName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // turns
        manager
            .create_table(
                Table::create()
                    .table(Turns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Turns::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Turns::SessionId).big_integer().not_null())
                    .col(ColumnDef::new(Turns::TurnNo).integer().not_null())
                    .col(ColumnDef::new(Turns::PlayerUid).string().not_null())
                    .col(ColumnDef::new(Turns::DurationMs).big_integer().not_null())
                    .col(ColumnDef::new(Turns::VpDeltas).json_binary().not_null())
                    .col(
                        ColumnDef::new(Turns::PlayedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_turns_session_id")
                            .from(Turns::Table, Turns::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_turns_session_turn_no")
                    .table(Turns::Table)
                    .col(Turns::SessionId)
                    .col(Turns::TurnNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order + drop index before table
        manager
            .drop_index(
                Index::drop()
                    .name("ux_turns_session_turn_no")
                    .table(Turns::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Turns::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ux_session_players_session_name")
                    .table(SessionPlayers::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("ux_session_players_session_uid")
                    .table(SessionPlayers::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(SessionPlayers::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
