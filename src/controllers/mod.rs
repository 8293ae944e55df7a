pub mod connectivity_controller;
