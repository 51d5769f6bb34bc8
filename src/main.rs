#[rocket::launch]
fn launch() -> _ {
    bugspot_server::init_logger();
    log::info!("Starting Bugspot API Server");
    bugspot_server::rocket()
}
