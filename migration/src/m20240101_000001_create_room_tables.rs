use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Games::Status)
                            .string()
                            .not_null()
                            .default("waiting"),
                    )
                    .col(ColumnDef::new(Games::StartTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Games::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Games::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Games::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Rooms::RoomCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Rooms::IsFull)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Rooms::Visibility)
                            .string()
                            .not_null()
                            .default("public"),
                    )
                    .col(
                        ColumnDef::new(Rooms::Status)
                            .string()
                            .not_null()
                            .default("waiting"),
                    )
                    .col(
                        ColumnDef::new(Rooms::EntryPoints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Rooms::Board).json())
                    .col(ColumnDef::new(Rooms::GameId).uuid().not_null())
                    .col(ColumnDef::new(Rooms::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Rooms::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rooms_game_id")
                            .from(Rooms::Table, Rooms::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Open-queue lookups scan for the oldest non-full public room
        manager
            .create_index(
                Index::create()
                    .name("idx_rooms_open_queue")
                    .table(Rooms::Table)
                    .col(Rooms::IsFull)
                    .col(Rooms::Visibility)
                    .col(Rooms::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Players::UserId).uuid().not_null())
                    .col(ColumnDef::new(Players::RoomId).uuid().not_null())
                    .col(ColumnDef::new(Players::GameId).uuid().not_null())
                    .col(ColumnDef::new(Players::Seat).integer().not_null())
                    .col(
                        ColumnDef::new(Players::Status)
                            .string()
                            .not_null()
                            .default("waiting"),
                    )
                    .col(
                        ColumnDef::new(Players::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Players::GamePoints)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Players::RemainingTime).integer())
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_room_id")
                            .from(Players::Table, Players::RoomId)
                            .to(Rooms::Table, Rooms::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_game_id")
                            .from(Players::Table, Players::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One seat per user per room
        manager
            .create_index(
                Index::create()
                    .name("idx_players_user_room")
                    .table(Players::Table)
                    .col(Players::UserId)
                    .col(Players::RoomId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_players_room_seat")
                    .table(Players::Table)
                    .col(Players::RoomId)
                    .col(Players::Seat)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerScores::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayerScores::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(PlayerScores::UserId).uuid().not_null())
                    .col(ColumnDef::new(PlayerScores::RoomId).uuid().not_null())
                    .col(ColumnDef::new(PlayerScores::GameId).uuid().not_null())
                    .col(ColumnDef::new(PlayerScores::FoundWord).string().not_null())
                    .col(ColumnDef::new(PlayerScores::Score).integer().not_null())
                    .col(ColumnDef::new(PlayerScores::TurnTime).integer())
                    .col(
                        ColumnDef::new(PlayerScores::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_scores_player_id")
                            .from(PlayerScores::Table, PlayerScores::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointsLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointsLog::Description).string().not_null())
                    .col(ColumnDef::new(PointsLog::UserId).uuid().not_null())
                    .col(ColumnDef::new(PointsLog::RoomId).uuid())
                    .col(
                        ColumnDef::new(PointsLog::PointsIn)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PointsLog::PointsOut)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PointsLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Balance queries aggregate per user
        manager
            .create_index(
                Index::create()
                    .name("idx_points_log_user_id")
                    .table(PointsLog::Table)
                    .col(PointsLog::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointsLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    RoomCode,
    IsFull,
    Visibility,
    Status,
    EntryPoints,
    Board,
    GameId,
    CreatedBy,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    Status,
    StartTime,
    EndTime,
    CreatedBy,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    UserId,
    RoomId,
    GameId,
    Seat,
    Status,
    Score,
    GamePoints,
    RemainingTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlayerScores {
    Table,
    Id,
    PlayerId,
    UserId,
    RoomId,
    GameId,
    FoundWord,
    Score,
    TurnTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PointsLog {
    Table,
    Id,
    Description,
    UserId,
    RoomId,
    PointsIn,
    PointsOut,
    CreatedAt,
}
