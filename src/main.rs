use log::error;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rocket = match api::launch().await {
        Ok(rocket) => rocket,
        Err(e) => {
            error!("Unable to start: {}", e);
            return Err(e);
        }
    };
    rocket.launch().await?;
    Ok(())
}
