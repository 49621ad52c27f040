mod tests {
    use core::net::Ipv4Addr;

    use ledcast_core::{DeviceConfig, MockPlatform, Platform, Rgb, WakeupEffect, BLACK};

    const CONFIG: DeviceConfig = DeviceConfig {
        side_id: "LEFT",
        run_count: 2,
        leds_per_run: [4, 3, 0, 0, 0, 0, 0, 0],
        port_base: 5000,
        status_port: 5100,
        local_ip: Ipv4Addr::new(10, 10, 0, 3),
        netmask: Ipv4Addr::new(255, 255, 255, 0),
        gateway: Ipv4Addr::new(10, 10, 0, 1),
        sender_ip: Ipv4Addr::new(10, 10, 0, 1),
    };

    const WARM_WHITE: Rgb = Rgb {
        r: 128,
        g: 100,
        b: 64,
    };

    fn wakeup(platform: &MockPlatform) -> WakeupEffect {
        WakeupEffect::new(CONFIG, platform.now())
    }

    #[test]
    fn test_walks_every_run() {
        let mut platform = MockPlatform::new();
        let mut wakeup = wakeup(&platform);

        // First poll lights run 0 across all its LEDs.
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 1);
        for index in 0..4 {
            assert_eq!(platform.led(0, index), WARM_WHITE);
        }
        for index in 0..3 {
            assert_eq!(platform.led(1, index), BLACK);
        }
        assert!(!wakeup.is_complete());

        // Run 0 stays lit for its full 200 ms.
        platform.set_time(199);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 1);
        assert_eq!(platform.led(0, 0), WARM_WHITE);

        // 200 ms: run 0 goes dark, gap before run 1.
        platform.set_time(200);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 2);
        assert_eq!(platform.led(0, 0), BLACK);
        assert_eq!(platform.led(1, 0), BLACK);

        // 50 ms gap, then run 1 lights.
        platform.set_time(249);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 2);
        platform.set_time(250);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 3);
        for index in 0..3 {
            assert_eq!(platform.led(1, index), WARM_WHITE);
        }

        // Run 1 done at 450 ms: walk complete, everything dark.
        platform.set_time(450);
        wakeup.poll(&mut platform);
        assert!(wakeup.is_complete());
        assert_eq!(platform.show_count(), 4);
        assert_eq!(platform.led(1, 0), BLACK);
    }

    #[test]
    fn test_complete_is_absorbing() {
        let mut platform = MockPlatform::new();
        let mut wakeup = wakeup(&platform);

        for ms in [0u64, 200, 250, 450] {
            platform.set_time(ms);
            wakeup.poll(&mut platform);
        }
        assert!(wakeup.is_complete());

        let shows = platform.show_count();
        platform.set_time(10_000);
        wakeup.poll(&mut platform);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), shows);
        assert!(wakeup.is_complete());
    }

    #[test]
    fn test_start_gated_on_busy() {
        let mut platform = MockPlatform::new();
        let mut wakeup = wakeup(&platform);

        platform.set_leds_busy(true);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 0);

        platform.set_leds_busy(false);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 1);
        assert_eq!(platform.led(0, 0), WARM_WHITE);
    }

    #[test]
    fn test_transition_held_while_busy() {
        let mut platform = MockPlatform::new();
        let mut wakeup = wakeup(&platform);

        wakeup.poll(&mut platform);
        assert_eq!(platform.led(0, 0), WARM_WHITE);

        // Past the lighting duration, but a transfer is in flight.
        platform.set_time(300);
        platform.set_leds_busy(true);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 1);
        assert_eq!(platform.led(0, 0), WARM_WHITE);

        platform.set_leds_busy(false);
        wakeup.poll(&mut platform);
        assert_eq!(platform.show_count(), 2);
        assert_eq!(platform.led(0, 0), BLACK);
    }
}
