#[macro_export]
macro_rules! drop_table {
    ($table:ident, $manager:ident) => {
        $manager
            .drop_table(Table::drop().table($table::Table).if_exists().to_owned())
            .await?
    };
}
