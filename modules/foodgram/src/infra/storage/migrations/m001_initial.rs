use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    FirstName,
    LastName,
    Avatar,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AuthTokens {
    Table,
    Key,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Ingredients {
    Table,
    Id,
    Name,
    MeasurementUnit,
    SearchName,
}

#[derive(DeriveIden)]
enum Recipes {
    Table,
    Id,
    AuthorId,
    Name,
    Image,
    Text,
    CookingTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecipeIngredients {
    Table,
    Id,
    RecipeId,
    IngredientId,
    Amount,
}

#[derive(DeriveIden)]
enum UserRecipeRelations {
    Table,
    Id,
    UserId,
    RecipeId,
    Kind,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    UserId,
    AuthorId,
    CreatedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn fk_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().to_owned()
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn cascade<T: IntoIden + 'static, R: IntoIden + 'static>(
    name: &str,
    table: T,
    col: impl IntoIden,
    ref_table: R,
    ref_col: impl IntoIden,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(ref_table, ref_col)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_col(Users::Id))
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null().unique_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null().unique_key())
                    .col(ColumnDef::new(Users::FirstName).string_len(150).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(150).not_null())
                    .col(ColumnDef::new(Users::Avatar).text().null())
                    .col(created_at(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuthTokens::Key).string_len(64).not_null().primary_key())
                    .col(fk_col(AuthTokens::UserId))
                    .col(created_at(AuthTokens::CreatedAt))
                    .foreign_key(&mut cascade(
                        "fk_auth_tokens_user",
                        AuthTokens::Table,
                        AuthTokens::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ingredients::Table)
                    .if_not_exists()
                    .col(id_col(Ingredients::Id))
                    .col(ColumnDef::new(Ingredients::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Ingredients::MeasurementUnit).string_len(200).not_null())
                    .col(ColumnDef::new(Ingredients::SearchName).string_len(200).not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ux_ingredients_name_unit")
                    .table(Ingredients::Table)
                    .col(Ingredients::Name)
                    .col(Ingredients::MeasurementUnit)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_ingredients_search_name")
                    .table(Ingredients::Table)
                    .col(Ingredients::SearchName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(id_col(Recipes::Id))
                    .col(fk_col(Recipes::AuthorId))
                    .col(ColumnDef::new(Recipes::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Recipes::Image).text().not_null())
                    .col(ColumnDef::new(Recipes::Text).text().not_null())
                    .col(
                        ColumnDef::new(Recipes::CookingTime)
                            .integer()
                            .not_null()
                            .check(Expr::col(Recipes::CookingTime).between(1, 1440)),
                    )
                    .col(created_at(Recipes::CreatedAt))
                    .foreign_key(&mut cascade(
                        "fk_recipes_author",
                        Recipes::Table,
                        Recipes::AuthorId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_recipes_created_at")
                    .table(Recipes::Table)
                    .col(Recipes::CreatedAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_recipes_author")
                    .table(Recipes::Table)
                    .col(Recipes::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredients::Table)
                    .if_not_exists()
                    .col(id_col(RecipeIngredients::Id))
                    .col(fk_col(RecipeIngredients::RecipeId))
                    .col(fk_col(RecipeIngredients::IngredientId))
                    .col(
                        ColumnDef::new(RecipeIngredients::Amount)
                            .integer()
                            .not_null()
                            .check(Expr::col(RecipeIngredients::Amount).between(1, 32000)),
                    )
                    .foreign_key(&mut cascade(
                        "fk_recipe_ingredients_recipe",
                        RecipeIngredients::Table,
                        RecipeIngredients::RecipeId,
                        Recipes::Table,
                        Recipes::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk_recipe_ingredients_ingredient",
                        RecipeIngredients::Table,
                        RecipeIngredients::IngredientId,
                        Ingredients::Table,
                        Ingredients::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ux_recipe_ingredients_pair")
                    .table(RecipeIngredients::Table)
                    .col(RecipeIngredients::RecipeId)
                    .col(RecipeIngredients::IngredientId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRecipeRelations::Table)
                    .if_not_exists()
                    .col(id_col(UserRecipeRelations::Id))
                    .col(fk_col(UserRecipeRelations::UserId))
                    .col(fk_col(UserRecipeRelations::RecipeId))
                    .col(ColumnDef::new(UserRecipeRelations::Kind).string_len(32).not_null())
                    .col(created_at(UserRecipeRelations::CreatedAt))
                    .foreign_key(&mut cascade(
                        "fk_user_recipe_relations_user",
                        UserRecipeRelations::Table,
                        UserRecipeRelations::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk_user_recipe_relations_recipe",
                        UserRecipeRelations::Table,
                        UserRecipeRelations::RecipeId,
                        Recipes::Table,
                        Recipes::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ux_user_recipe_relations_triple")
                    .table(UserRecipeRelations::Table)
                    .col(UserRecipeRelations::UserId)
                    .col(UserRecipeRelations::RecipeId)
                    .col(UserRecipeRelations::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(id_col(Subscriptions::Id))
                    .col(fk_col(Subscriptions::UserId))
                    .col(fk_col(Subscriptions::AuthorId))
                    .col(created_at(Subscriptions::CreatedAt))
                    .check(Expr::col(Subscriptions::UserId).ne(Expr::col(Subscriptions::AuthorId)))
                    .foreign_key(&mut cascade(
                        "fk_subscriptions_user",
                        Subscriptions::Table,
                        Subscriptions::UserId,
                        Users::Table,
                        Users::Id,
                    ))
                    .foreign_key(&mut cascade(
                        "fk_subscriptions_author",
                        Subscriptions::Table,
                        Subscriptions::AuthorId,
                        Users::Table,
                        Users::Id,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ux_subscriptions_pair")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::UserId)
                    .col(Subscriptions::AuthorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRecipeRelations::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeIngredients::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredients::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}
