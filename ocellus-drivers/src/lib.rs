//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in ocellus-core, written against the bus traits of ocellus-hal:
//!
//! - Display panels (ST7789 over SPI)
//! - PWM controllers (PCA9685 over I2C) and the breathing ramp generator

#![deny(unsafe_code)]

pub mod display;
pub mod pwm;
