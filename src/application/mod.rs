//! Application layer
//! 비동기 핸들러를 동기 디스패처가 부를 수 있는 형태로 바꾸는 브리지를 제공한다.

pub mod bridge;
