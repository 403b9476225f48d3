extern crate iron;
extern crate iron_cachecontrol;

use std::time::Duration;

use iron::prelude::*;
use iron::middleware::Handler;
use iron::status;
use iron_cachecontrol::{build_entry_point, CacheControlOptions, CacheControlled};

const ADDRESS: &'static str = "127.0.0.1:8000";
const ASSETS_ADDRESS: &'static str = "127.0.0.1:8001";

struct Dashboard;

impl Handler for Dashboard {
    fn handle(&self, _req: &mut Request) -> IronResult<Response> {
        Ok(Response::with((status::Ok, "Welcome back")))
    }
}

impl CacheControlled for Dashboard {
    fn cache_control() -> CacheControlOptions {
        CacheControlOptions::new().private(true).max_age(3600)
    }
}

fn logo(_req: &mut Request) -> IronResult<Response> {
    Ok(Response::with((status::Ok, "<svg/>")))
}

fn main() {
    let assets = CacheControlOptions::public_for(Duration::from_secs(7 * 24 * 60 * 60));
    let assets_entry = build_entry_point(&assets, || logo);

    let _assets = Iron::new(assets_entry).http(ASSETS_ADDRESS).expect("Unable to start asset server");
    let _server = Iron::new(Dashboard.into_entry_point()).http(ADDRESS).expect("Unable to start server");
    println!("Server listening at {} (assets at {})", ADDRESS, ASSETS_ADDRESS);
}
